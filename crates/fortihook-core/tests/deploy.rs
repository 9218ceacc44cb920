//! End-to-end deploys against the in-memory FortiGate.

#![allow(clippy::unwrap_used)]

mod common;

use common::{CERT_NAME, DOMAIN, FakeFortigate, cert_file, key_file, record};
use fortihook_core::{
    Binding, CoreError, Decision, DeployMode, DeployOutcome, DeployRequest, deploy,
};
use pretty_assertions::assert_eq;

fn request() -> DeployRequest {
    DeployRequest {
        domain: DOMAIN.into(),
        key_file: key_file(),
        cert_file: cert_file(),
    }
}

const LISTING: &[&str] = &["config vpn certificate local", "get", "end"];
const INSTALL: &[&str] = &[
    "config vpn certificate local",
    "edit LE_www_20250101120000Z",
    "set private-key <key>",
    "set certificate <cert>",
    "end",
];

fn expected(blocks: &[&[&str]]) -> Vec<String> {
    blocks
        .iter()
        .flat_map(|block| block.iter().map(|&line| line.to_owned()))
        .chain(std::iter::once("exit".to_owned()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn fresh_install_with_wifi_binding() {
    let device = FakeFortigate::new();
    let outcome = deploy(
        &device.connector(),
        Some(&record(true, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        DeployOutcome::Installed {
            domain: DOMAIN.into(),
            certificate_name: CERT_NAME.into(),
            bindings: vec![Binding::Wifi],
        }
    );
    assert_eq!(
        device.commands(),
        expected(&[
            LISTING,
            INSTALL,
            &[
                "config system global",
                "set wifi-certificate LE_www_20250101120000Z",
                "end",
            ],
        ])
    );

    let state = device.state();
    assert!(state.certificates.iter().any(|c| c == CERT_NAME));
    assert_eq!(
        state.settings.get("global.wifi-certificate").map(String::as_str),
        Some(CERT_NAME)
    );
}

#[tokio::test(start_paused = true)]
async fn key_and_certificate_are_sent_verbatim_as_quoted_values() {
    let device = FakeFortigate::new();
    deploy(
        &device.connector(),
        Some(&record(false, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();

    let key = std::fs::read_to_string(key_file()).unwrap();
    let cert = std::fs::read_to_string(cert_file()).unwrap();
    let received = device.state().received.clone();
    assert!(received.contains(&format!("set private-key \"{}\"", key.trim_end())));
    assert!(received.contains(&format!("set certificate \"{}\"", cert.trim_end())));
}

#[tokio::test(start_paused = true)]
async fn installed_certificate_is_left_alone() {
    let device = FakeFortigate::new().with(|s| s.certificates.push(CERT_NAME.into()));
    let outcome = deploy(
        &device.connector(),
        Some(&record(true, true, true)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        DeployOutcome::AlreadyInstalled {
            domain: DOMAIN.into(),
            certificate_name: CERT_NAME.into(),
        }
    );
    assert_eq!(device.commands(), expected(&[LISTING]));
}

#[tokio::test(start_paused = true)]
async fn admin_binding_unsets_before_setting() {
    let device = FakeFortigate::new().with(|s| {
        s.settings
            .insert("global.admin-server-cert".into(), "Fortinet_Factory".into());
    });
    deploy(
        &device.connector(),
        Some(&record(false, false, true)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();

    assert_eq!(
        device.commands(),
        expected(&[
            LISTING,
            INSTALL,
            &[
                "config system global",
                "unset admin-server-cert",
                "end",
                "config system global",
                "set admin-server-cert LE_www_20250101120000Z",
                "end",
            ],
        ])
    );
    assert_eq!(
        device
            .state()
            .settings
            .get("global.admin-server-cert")
            .map(String::as_str),
        Some(CERT_NAME)
    );
}

#[tokio::test(start_paused = true)]
async fn all_bindings_apply_in_order() {
    let device = FakeFortigate::new();
    let outcome = deploy(
        &device.connector(),
        Some(&record(true, true, true)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();

    let DeployOutcome::Installed { bindings, .. } = outcome else {
        panic!("expected install, got {outcome:?}");
    };
    assert_eq!(bindings, [Binding::Wifi, Binding::Vpn, Binding::Admin]);

    let commands = device.commands();
    let position = |needle: &str| commands.iter().position(|c| c == needle).unwrap();
    let wifi = position("set wifi-certificate LE_www_20250101120000Z");
    let vpn = position("set servercert LE_www_20250101120000Z");
    let admin = position("unset admin-server-cert");
    assert!(wifi < vpn && vpn < admin);
    assert_eq!(
        device.state().settings.get("settings.servercert").map(String::as_str),
        Some(CERT_NAME)
    );
}

#[tokio::test(start_paused = true)]
async fn missing_record_is_a_no_op() {
    let device = FakeFortigate::new();
    let request = DeployRequest {
        domain: "unknown.example.net".into(),
        key_file: "/nonexistent/key.pem".into(),
        cert_file: "/nonexistent/cert.pem".into(),
    };
    let outcome = deploy(&device.connector(), None, &request, DeployMode::Apply)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DeployOutcome::NoConfiguration {
            domain: "unknown.example.net".into()
        }
    );
    assert_eq!(device.state().connects, 0);
}

#[tokio::test(start_paused = true)]
async fn silent_login_times_out_without_commands() {
    let device = FakeFortigate::new().with(|s| s.mute_login = true);
    let err = deploy(
        &device.connector(),
        Some(&record(true, true, true)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {err}");
    assert!(device.state().received.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_password_is_an_auth_failure() {
    let device = FakeFortigate::new().with(|s| s.reject_auth = true);
    let err = deploy(
        &device.connector(),
        Some(&record(false, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(device.state().received.is_empty());
}

#[tokio::test(start_paused = true)]
async fn admin_set_timeout_leaves_certificate_unset() {
    // listing (3) + install (5) + unset block (3) + `config system global`
    // answered; the set line hangs
    let device = FakeFortigate::new().with(|s| {
        s.silent_after = Some(12);
        s.settings
            .insert("global.admin-server-cert".into(), "Fortinet_Factory".into());
    });
    let err = deploy(
        &device.connector(),
        Some(&record(false, false, true)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap_err();

    let CoreError::ProtocolTimeout { step, .. } = &err else {
        panic!("expected timeout, got {err:?}");
    };
    assert_eq!(step, "set admin-server-cert LE_www_20250101120000Z");

    let mut sent = expected(&[
        LISTING,
        INSTALL,
        &[
            "config system global",
            "unset admin-server-cert",
            "end",
            "config system global",
            "set admin-server-cert LE_www_20250101120000Z",
        ],
    ]);
    // no logout after a failure
    sent.pop();
    assert_eq!(device.commands(), sent);

    let state = device.state();
    assert!(state.certificates.iter().any(|c| c == CERT_NAME));
    assert_eq!(state.settings.get("global.admin-server-cert"), None);
}

#[tokio::test(start_paused = true)]
async fn timeout_mid_install_aborts_without_bindings() {
    // listing (3) + config + edit answered; the private key line hangs
    let device = FakeFortigate::new().with(|s| s.silent_after = Some(5));
    let err = deploy(
        &device.connector(),
        Some(&record(true, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap_err();

    let CoreError::ProtocolTimeout { step, .. } = &err else {
        panic!("expected timeout, got {err:?}");
    };
    assert_eq!(step, "set private-key \"<redacted>\"");
    assert_eq!(
        device.commands(),
        [
            "config vpn certificate local",
            "get",
            "end",
            "config vpn certificate local",
            "edit LE_www_20250101120000Z",
            "set private-key <key>",
        ]
    );
    assert!(!device.state().certificates.iter().any(|c| c == CERT_NAME));
}

#[tokio::test(start_paused = true)]
async fn dry_run_only_lists() {
    let device = FakeFortigate::new();
    let outcome = deploy(
        &device.connector(),
        Some(&record(false, true, false)),
        &request(),
        DeployMode::DryRun,
    )
    .await
    .unwrap();

    let DeployOutcome::Planned(plan) = outcome else {
        panic!("expected plan, got {outcome:?}");
    };
    assert_eq!(plan.decision, Decision::MustInstall);
    assert_eq!(plan.bindings, [Binding::Vpn]);
    assert_eq!(plan.installed_count, 2);
    assert_eq!(device.commands(), expected(&[LISTING]));
}

#[tokio::test(start_paused = true)]
async fn second_run_is_idempotent() {
    let device = FakeFortigate::new();
    let first = deploy(
        &device.connector(),
        Some(&record(true, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();
    assert!(matches!(first, DeployOutcome::Installed { .. }));

    device.state().received.clear();
    let second = deploy(
        &device.connector(),
        Some(&record(true, false, false)),
        &request(),
        DeployMode::Apply,
    )
    .await
    .unwrap();
    assert!(matches!(second, DeployOutcome::AlreadyInstalled { .. }));
    assert_eq!(device.commands(), expected(&[LISTING]));
}

#[tokio::test(start_paused = true)]
async fn certificate_on_a_later_page_is_found() {
    for pages in 1..=5_usize {
        // five lines per certificate entry in the fake listing
        let device = FakeFortigate::new().with(|s| {
            s.certificates = (0..pages * 2 - 1).map(|i| format!("cert_{i}")).collect();
            s.certificates.push(CERT_NAME.into());
            s.page_size = 10;
            s.chunk_size = 7;
        });
        let outcome = deploy(
            &device.connector(),
            Some(&record(false, false, false)),
            &request(),
            DeployMode::Apply,
        )
        .await
        .unwrap();

        assert!(
            matches!(outcome, DeployOutcome::AlreadyInstalled { .. }),
            "{pages} page(s): {outcome:?}"
        );
        assert_eq!(device.state().pages_continued, pages - 1);
    }
}
