//! OS shutdown command invocation

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::ShutdownAction;

/// Arguments for scheduling a shutdown `seconds` from now
fn schedule_args(seconds: u64) -> Vec<String> {
    if cfg!(windows) {
        vec!["-s".into(), "-t".into(), seconds.to_string()]
    } else if seconds == 0 {
        vec!["-h".into(), "now".into()]
    } else {
        // shutdown(8) only understands whole minutes
        vec!["-h".into(), format!("+{}", seconds.div_ceil(60))]
    }
}

fn cancel_args() -> Vec<String> {
    if cfg!(windows) {
        vec!["-a".into()]
    } else {
        vec!["-c".into()]
    }
}

async fn run_shutdown(args: &[String]) -> Result<(), String> {
    debug!("Running shutdown {}", args.join(" "));

    let output = Command::new("shutdown")
        .args(args)
        .output()
        .await
        .map_err(|e| format!("Failed to execute shutdown: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("shutdown {} failed: {}", args.join(" "), stderr.trim()));
    }

    Ok(())
}

/// Schedules shutdowns through the platform `shutdown` command
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdown;

#[async_trait]
impl ShutdownAction for SystemShutdown {
    async fn schedule(&self, seconds: u64) -> Result<(), String> {
        info!("Scheduling system shutdown in {} seconds", seconds);
        run_shutdown(&schedule_args(seconds)).await?;
        info!("System shutdown scheduled");
        Ok(())
    }

    async fn cancel(&self) -> Result<(), String> {
        info!("Cancelling scheduled system shutdown");
        run_shutdown(&cancel_args()).await?;
        info!("System shutdown cancelled");
        Ok(())
    }
}

/// Logs shutdown requests without touching the OS
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunShutdown;

#[async_trait]
impl ShutdownAction for DryRunShutdown {
    async fn schedule(&self, seconds: u64) -> Result<(), String> {
        info!("[dry-run] would run: shutdown {}", schedule_args(seconds).join(" "));
        Ok(())
    }

    async fn cancel(&self) -> Result<(), String> {
        info!("[dry-run] would run: shutdown {}", cancel_args().join(" "));
        Ok(())
    }
}

/// Check that a `shutdown` binary can be found on this system
pub async fn check_shutdown_available() -> Result<(), String> {
    let probe = if cfg!(windows) { "where" } else { "which" };
    let output = Command::new(probe)
        .arg("shutdown")
        .output()
        .await
        .map_err(|e| format!("Failed to look up shutdown command: {}", e))?;

    if !output.status.success() {
        return Err("shutdown command is not available on this system".to_string());
    }

    info!("shutdown command is available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn unix_args_round_up_to_minutes() {
        assert_eq!(schedule_args(0), vec!["-h", "now"]);
        assert_eq!(schedule_args(60), vec!["-h", "+1"]);
        assert_eq!(schedule_args(61), vec!["-h", "+2"]);
        assert_eq!(cancel_args(), vec!["-c"]);
    }

    #[cfg(windows)]
    #[test]
    fn windows_args_use_seconds() {
        assert_eq!(schedule_args(300), vec!["-s", "-t", "300"]);
        assert_eq!(cancel_args(), vec!["-a"]);
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        assert!(DryRunShutdown.schedule(300).await.is_ok());
        assert!(DryRunShutdown.cancel().await.is_ok());
    }
}
