//! Named string options passed through to job/pod construction.
//!
//! The core does not interpret these values; it carries them so embedders
//! build jobs and pods consistently. Everything has a default suitable for
//! a vanilla deployment.

/// Opaque configuration for the backup services built on this core.
///
/// ## Field semantics
/// - annotations mark resources that should be backed up, carry a custom
///   backup command, or override the dumped file extension
/// - `check_schedule` is a cron expression for the periodic archive check
/// - `job_name`/`pod_name` are naming templates for spawned workloads
/// - the pod-exec account and role are what per-pod command execution runs as
#[derive(Clone, Debug)]
pub struct Config {
    /// Annotation that marks a pod for backup.
    pub annotation: String,
    /// Annotation carrying a custom backup command.
    pub backup_command_annotation: String,
    /// Annotation overriding the file extension of command-based dumps.
    pub file_extension_annotation: String,
    /// Default cron schedule for archive checks.
    pub check_schedule: String,
    /// Mount path the backup data is read from.
    pub data_path: String,
    /// Naming template for backup jobs.
    pub job_name: String,
    /// Naming template for backup pods.
    pub pod_name: String,
    /// Service account used to execute per-pod commands.
    pub pod_exec_account_name: String,
    /// Role bound to the pod-exec service account.
    pub pod_exec_role_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotation: "jobwatch.io/backup".to_string(),
            backup_command_annotation: "jobwatch.io/backupcommand".to_string(),
            file_extension_annotation: "jobwatch.io/file-extension".to_string(),
            check_schedule: "0 0 * * 0".to_string(),
            data_path: "/data".to_string(),
            job_name: "backupjob".to_string(),
            pod_name: "backupjob-pod".to_string(),
            pod_exec_account_name: "pod-executor".to_string(),
            pod_exec_role_name: "pod-executor".to_string(),
        }
    }
}
