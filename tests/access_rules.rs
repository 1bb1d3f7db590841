use devcore_gate::{
    models::{
        decision::{Decision, RedirectTarget},
        session::{Role, SessionClaims},
    },
    services::{access::AccessRules, session::SessionDecoder},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

const NOW: i64 = 1_800_000_000;

fn session(role: Option<Role>, verified: bool) -> SessionClaims {
    SessionClaims {
        subject_id: "65a1f0e2".into(),
        email: "learner@devcore.test".into(),
        role,
        is_email_verified: verified,
        issued_at: Some(NOW - 600),
        expires_at: NOW + 3600,
    }
}

fn redirect(target: RedirectTarget) -> Decision {
    Decision::Redirect(target)
}

const PATHS: &[&str] = &[
    "/",
    "/courses",
    "/about",
    "/role",
    "/login",
    "/register",
    "/dashboard",
    "/dashboard/my-courses",
    "/cart",
    "/checkout",
    "/payment-success",
    "/profile/settings",
    "/admin",
    "/admin/statistics",
    "/teacher-dashboard",
    "/teacher-dashboard/courses/new",
    "/courses/rust-for-beginners",
    "/api/health",
];

#[test]
fn test_public_paths_always_continue() {
    let rules = AccessRules::default();
    let expired = SessionClaims {
        expires_at: NOW - 1,
        ..session(Some(Role::Admin), true)
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &expired,
        &EncodingKey::from_secret(b"secret"),
    )
    .unwrap();
    let expired_session = SessionDecoder::unverified().session(Some(&token), NOW);
    let malformed_session = SessionDecoder::unverified().session(Some("not-a-token"), NOW);

    let states = [
        None,
        Some(session(Some(Role::Student), true)),
        Some(session(Some(Role::Teacher), false)),
        Some(session(Some(Role::Admin), true)),
        Some(session(None, false)),
        expired_session,
        malformed_session,
    ];

    for path in &rules.public_paths {
        for state in &states {
            assert_eq!(
                rules.evaluate(path, state.as_ref()),
                Decision::Continue,
                "{path} with {state:?}"
            );
        }
    }
}

#[test]
fn test_role_selection() {
    let rules = AccessRules::default();

    assert_eq!(rules.evaluate("/role", None), redirect(RedirectTarget::Register));
    assert_eq!(
        rules.evaluate("/role", Some(&session(Some(Role::Student), false))),
        redirect(RedirectTarget::Home)
    );
    assert_eq!(
        rules.evaluate("/role", Some(&session(None, false))),
        Decision::Continue
    );
}

#[test]
fn test_auth_entry() {
    let rules = AccessRules::default();

    for path in ["/login", "/register"] {
        assert_eq!(rules.evaluate(path, None), Decision::Continue);
        assert_eq!(
            rules.evaluate(path, Some(&session(Some(Role::Teacher), true))),
            redirect(RedirectTarget::Home)
        );
        assert_eq!(
            rules.evaluate(path, Some(&session(None, true))),
            redirect(RedirectTarget::RoleSelection)
        );
        assert_eq!(
            rules.evaluate(path, Some(&session(Some(Role::Student), false))),
            Decision::Continue
        );
    }
}

#[test]
fn test_admin_area() {
    let rules = AccessRules::default();

    assert_eq!(
        rules.evaluate("/admin/statistics", Some(&session(Some(Role::Teacher), true))),
        redirect(RedirectTarget::Home)
    );
    assert_eq!(
        rules.evaluate("/admin/statistics", Some(&session(Some(Role::Admin), true))),
        Decision::Continue
    );
    assert_eq!(
        rules.evaluate("/admin/statistics", None),
        redirect(RedirectTarget::Login)
    );
    assert_eq!(
        rules.evaluate("/admin", Some(&session(None, true))),
        redirect(RedirectTarget::Login)
    );
}

#[test]
fn test_teacher_dashboard() {
    let rules = AccessRules::default();

    assert_eq!(
        rules.evaluate("/teacher-dashboard", Some(&session(Some(Role::Student), true))),
        redirect(RedirectTarget::StudentDashboard)
    );
    assert_eq!(
        rules.evaluate("/teacher-dashboard", Some(&session(Some(Role::Teacher), true))),
        Decision::Continue
    );
    assert_eq!(
        rules.evaluate("/teacher-dashboard/courses/new", Some(&session(Some(Role::Admin), true))),
        redirect(RedirectTarget::Home)
    );
    assert_eq!(
        rules.evaluate("/teacher-dashboard", None),
        redirect(RedirectTarget::Login)
    );
}

#[test]
fn test_student_dashboard() {
    let rules = AccessRules::default();

    assert_eq!(
        rules.evaluate("/dashboard", Some(&session(Some(Role::Teacher), true))),
        redirect(RedirectTarget::TeacherDashboard)
    );
    assert_eq!(
        rules.evaluate("/dashboard", Some(&session(Some(Role::Student), true))),
        Decision::Continue
    );
    assert_eq!(rules.evaluate("/dashboard", None), redirect(RedirectTarget::Login));
    assert_eq!(
        rules.evaluate("/dashboard/my-courses", Some(&session(Some(Role::Admin), true))),
        redirect(RedirectTarget::Home)
    );
    assert_eq!(
        rules.evaluate("/dashboard/my-courses", Some(&session(Some(Role::Other), true))),
        redirect(RedirectTarget::Home)
    );
}

#[test]
fn test_generic_protected_area() {
    let rules = AccessRules::default();

    for path in ["/cart", "/checkout", "/payment-success", "/profile/settings"] {
        assert_eq!(rules.evaluate(path, None), redirect(RedirectTarget::Login));
        assert_eq!(
            rules.evaluate(path, Some(&session(None, true))),
            redirect(RedirectTarget::Home)
        );
        assert_eq!(
            rules.evaluate(path, Some(&session(Some(Role::Teacher), false))),
            Decision::Continue
        );
    }
}

#[test]
fn test_unclassified_paths_fail_open() {
    let rules = AccessRules::default();

    assert_eq!(rules.evaluate("/courses/rust-for-beginners", None), Decision::Continue);
    assert_eq!(rules.evaluate("/api/health", None), Decision::Continue);
}

#[test]
fn test_evaluation_is_idempotent() {
    let rules = AccessRules::default();
    let states = [
        None,
        Some(session(Some(Role::Student), true)),
        Some(session(Some(Role::Teacher), true)),
        Some(session(None, false)),
    ];

    for path in PATHS {
        for state in &states {
            let first = rules.evaluate(path, state.as_ref());
            let second = rules.evaluate(path, state.as_ref());
            assert_eq!(first, second, "{path}");
        }
    }
}

#[test]
fn test_expired_token_equals_no_token() {
    let rules = AccessRules::default();
    let decoder = SessionDecoder::hs256("course-secret");

    for role in [Some(Role::Student), Some(Role::Teacher), Some(Role::Admin), None] {
        let expired = SessionClaims {
            expires_at: NOW - 30,
            ..session(role, true)
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(b"course-secret"),
        )
        .unwrap();
        let decoded = decoder.session(Some(&token), NOW);
        assert_eq!(decoded, None);

        for path in PATHS {
            assert_eq!(
                rules.evaluate(path, decoded.as_ref()),
                rules.evaluate(path, None),
                "{path}"
            );
        }
    }
}

#[test]
fn test_rules_from_json_file() {
    let mut rules = AccessRules::default();
    rules.public_paths.push("/pricing".into());

    let file = std::env::temp_dir().join(format!("devcore-rules-{}.json", std::process::id()));
    std::fs::write(&file, serde_json::to_string_pretty(&rules).unwrap()).unwrap();

    let loaded = AccessRules::load(file.to_str()).unwrap();
    assert_eq!(loaded, rules);
    assert_eq!(loaded.evaluate("/pricing", None), Decision::Continue);

    std::fs::write(&file, r#"{"public_paths":["pricing"],"role_selection_path":"/role","auth_entry_paths":[],"guarded_areas":[]}"#).unwrap();
    assert!(AccessRules::load(file.to_str()).is_err());

    std::fs::remove_file(&file).unwrap();
}
