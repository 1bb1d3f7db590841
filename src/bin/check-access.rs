/// Evaluate the access rules for one path, offline.
///
/// Usage: check-access --path /dashboard [--token JWT | --role student [--verified]]
///   --rules FILE   : JSON rule table (built-in DevCore routes if omitted)
///   --secret S     : verify the token signature with HS256
///   --now TS       : evaluate at this unix timestamp instead of the current time
///   --dump-rules   : print the effective rule table and exit

use clap::Parser;
use devcore_gate::{
    models::session::{Role, SessionClaims},
    services::{access::AccessRules, session::SessionDecoder},
};

#[derive(Parser)]
#[command(name = "check-access", about = "Show how the DevCore gate routes a request")]
struct Args {
    /// Request path, without query string
    #[arg(long, required_unless_present = "dump_rules")]
    path: Option<String>,

    /// Session token as found in the auth cookie
    #[arg(long, conflicts_with = "role")]
    token: Option<String>,

    /// Build a session with this role instead of decoding a token ("none" for unset)
    #[arg(long)]
    role: Option<String>,

    /// Mark the synthesized session as email-verified
    #[arg(long, requires = "role")]
    verified: bool,

    #[arg(long)]
    rules: Option<String>,

    #[arg(long)]
    secret: Option<String>,

    #[arg(long)]
    now: Option<i64>,

    #[arg(long)]
    dump_rules: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let rules = AccessRules::load(args.rules.as_deref())?;

    if args.dump_rules {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    let Some(path) = args.path else {
        anyhow::bail!("--path is required");
    };
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let session = match (args.token, args.role) {
        (Some(token), _) => {
            let decoder = SessionDecoder::from_secret(args.secret.as_deref());
            decoder.session(Some(&token), now)
        }
        (None, Some(role)) => {
            let role = match role.as_str() {
                "none" => None,
                other => Some(other.parse::<Role>()?),
            };
            Some(SessionClaims {
                subject_id: "check-access".into(),
                email: String::new(),
                role,
                is_email_verified: args.verified,
                issued_at: Some(now),
                expires_at: now + 3600,
            })
        }
        (None, None) => None,
    };

    match &session {
        Some(claims) => tracing::info!(
            role = ?claims.role,
            verified = claims.is_email_verified,
            "Evaluating as authenticated"
        ),
        None => tracing::info!("Evaluating as unauthenticated"),
    }

    println!("{}", rules.evaluate(&path, session.as_ref()));

    Ok(())
}
