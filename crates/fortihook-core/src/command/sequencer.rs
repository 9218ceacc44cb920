// Runs command blocks against a live session, one confirmed line at a time.

use fortihook_ssh::Transport;
use tracing::{debug, warn};

use super::{CommandBlock, fortigate};
use crate::certificate::CertificateDescriptor;
use crate::error::CoreError;
use crate::inventory::CertificateInventory;
use crate::planner::Binding;
use crate::session::InteractiveSession;

/// Borrows a session for the duration of a deploy.
pub struct CommandSequencer<'s, T> {
    session: &'s mut InteractiveSession<T>,
}

impl<'s, T: Transport> CommandSequencer<'s, T> {
    pub fn new(session: &'s mut InteractiveSession<T>) -> Self {
        Self { session }
    }

    /// Execute every line of `block` in order and return the combined
    /// output. Stops at the first line that fails; earlier lines stay
    /// applied.
    pub async fn run(&mut self, block: &CommandBlock) -> Result<String, CoreError> {
        debug!(block = block.label, lines = block.lines.len(), "running command block");
        let mut output = String::new();
        for line in &block.lines {
            if line.is_paged() {
                let paged = self.session.execute_paged(line).await?;
                output.push_str(&paged.text);
            } else {
                output.push_str(&self.session.execute(line).await?);
            }
        }
        Ok(output)
    }

    /// Read the certificate listing, draining every page.
    pub async fn list_certificates(&mut self) -> Result<CertificateInventory, CoreError> {
        let listing = self.run(&fortigate::list_certificates()).await?;
        Ok(CertificateInventory::parse(&listing))
    }

    pub async fn install(&mut self, cert: &CertificateDescriptor) -> Result<(), CoreError> {
        self.run(&fortigate::install(cert)).await?;
        Ok(())
    }

    pub async fn bind(&mut self, binding: Binding, name: &str) -> Result<(), CoreError> {
        match binding {
            Binding::Wifi => self.run(&fortigate::bind_wifi(name)).await.map(drop),
            Binding::Vpn => self.run(&fortigate::bind_vpn(name)).await.map(drop),
            Binding::Admin => self.bind_admin(name).await,
        }
    }

    async fn bind_admin(&mut self, name: &str) -> Result<(), CoreError> {
        let [unset, set] = fortigate::bind_admin(name);
        self.run(&unset).await?;
        if let Err(e) = self.run(&set).await {
            warn!(
                certificate = name,
                applied = unset.label,
                "admin-server-cert was unset but setting the new certificate failed; \
                 the device is left without an admin certificate"
            );
            return Err(e);
        }
        Ok(())
    }
}
