// FortiOS CLI vocabulary and the blocks built from it.

use secrecy::ExposeSecret;

use super::{CommandBlock, CommandLine};
use crate::certificate::CertificateDescriptor;

// ── Vocabulary ──────────────────────────────────────────────────────

pub const CERTIFICATE_CONTEXT: &str = "config vpn certificate local";
pub const GLOBAL_CONTEXT: &str = "config system global";
pub const SSL_VPN_CONTEXT: &str = "config vpn ssl settings";
pub const LIST: &str = "get";
pub const END: &str = "end";

pub const WIFI_FIELD: &str = "wifi-certificate";
pub const VPN_FIELD: &str = "servercert";
pub const ADMIN_FIELD: &str = "admin-server-cert";

// ── Blocks ──────────────────────────────────────────────────────────

/// List every local certificate. The `get` line is paged.
pub fn list_certificates() -> CommandBlock {
    CommandBlock::new(
        "list certificates",
        [
            CommandLine::new(CERTIFICATE_CONTEXT),
            CommandLine::paged(LIST),
            CommandLine::new(END),
        ],
    )
}

/// Upload key and certificate under the descriptor's name.
pub fn install(cert: &CertificateDescriptor) -> CommandBlock {
    let key = cert.private_key().expose_secret().trim_end();
    let certificate = cert.certificate_pem().trim_end();
    CommandBlock::new(
        "install certificate",
        [
            CommandLine::new(CERTIFICATE_CONTEXT),
            CommandLine::new(format!("edit {}", cert.name())),
            CommandLine::sensitive(
                format!("set private-key \"{key}\""),
                "set private-key \"<redacted>\"",
            ),
            CommandLine::new(format!("set certificate \"{certificate}\"")),
            CommandLine::new(END),
        ],
    )
}

/// Enter `context`, point `field` at `name`, leave.
pub fn bind_simple(label: &'static str, context: &str, field: &str, name: &str) -> CommandBlock {
    CommandBlock::new(
        label,
        [
            CommandLine::new(context),
            CommandLine::new(format!("set {field} {name}")),
            CommandLine::new(END),
        ],
    )
}

pub fn bind_wifi(name: &str) -> CommandBlock {
    bind_simple("bind wifi certificate", GLOBAL_CONTEXT, WIFI_FIELD, name)
}

pub fn bind_vpn(name: &str) -> CommandBlock {
    bind_simple("bind ssl-vpn certificate", SSL_VPN_CONTEXT, VPN_FIELD, name)
}

/// The admin certificate cannot be overwritten in place: the old reference
/// is cleared and committed first, then the new one is set.
pub fn bind_admin(name: &str) -> [CommandBlock; 2] {
    [
        CommandBlock::new(
            "unset admin certificate",
            [
                CommandLine::new(GLOBAL_CONTEXT),
                CommandLine::new(format!("unset {ADMIN_FIELD}")),
                CommandLine::new(END),
            ],
        ),
        bind_simple("bind admin certificate", GLOBAL_CONTEXT, ADMIN_FIELD, name),
    ]
}
