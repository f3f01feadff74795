use membership::EtcdUrls;
use membership::MembershipClient;
use roster::RosterProvider;

use super::Reconciler;
use crate::envfile::EnvFile;
use crate::envfile::WriteOutcome;
use crate::SyncError;

/// sync_etcd_peers runs one reconciliation and persists its outcome to `env`.
///
/// If `env` already exists the node counts as configured: nothing is looked up and no
/// membership call is made.
pub fn sync_etcd_peers<P, C>(
    provider: &P,
    client: &C,
    urls: &EtcdUrls,
    env: &EnvFile,
) -> Result<WriteOutcome, SyncError>
where
    P: RosterProvider + ?Sized,
    C: MembershipClient + ?Sized,
{
    if env.is_present() {
        info!("env file already created, exiting"; "path" => %env.path().display());
        return Ok(WriteOutcome::AlreadyPresent);
    }

    let local = provider.local_identity()?;
    let roster = provider.roster()?;

    info!("loaded roster";
        "name" => &local.name,
        "address" => &local.address,
        "members" => roster.len());

    let rec = Reconciler::new(client, urls.clone()).reconcile(&local, &roster)?;

    info!("writing env file";
        "path" => %env.path().display(),
        "state" => %rec.cluster_state(),
        "initial_cluster" => rec.initial_cluster_str());

    let outcome = env.write(&rec)?;
    Ok(outcome)
}
