use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::desktop::backend::DesktopBackend;
use crate::desktop::types::RawWindow;
use crate::minimize::errors::MinimizeError;
use crate::minimize::types::{AppRef, MinimizeContext, MinimizePlan};

/// Partition one window snapshot into windows to minimize and windows to restore.
///
/// Protected handles are the explicit window refs plus every window owned by
/// a protected pid or by the host itself. Protected windows are restored only
/// when minimized, so a maximized protected window keeps its placement.
pub fn plan_show_desktop(
    windows: &[RawWindow],
    protected: &[AppRef],
    ctx: &MinimizeContext,
) -> MinimizePlan {
    let mut protected_pids: HashSet<u32> = protected.iter().filter_map(AppRef::process).collect();
    protected_pids.insert(ctx.own_pid);
    let protected_hwnds: HashSet<u64> = protected.iter().filter_map(AppRef::window).collect();

    let mut plan = MinimizePlan::default();
    let mut seen = HashSet::new();

    for window in windows {
        if !window.visible || !seen.insert(window.hwnd) {
            continue;
        }
        if ctx.is_skipped_class(&window.class_name) {
            plan.skipped += 1;
            continue;
        }

        let is_protected = protected_hwnds.contains(&window.hwnd)
            || protected_pids.contains(&window.process_id);

        if is_protected {
            if window.minimized {
                plan.restore.push(window.hwnd);
            }
        } else if !window.minimized {
            plan.minimize.push(window.hwnd);
        }
    }

    plan
}

/// Minimize every visible top-level window except the protected ones.
///
/// Fails with [`MinimizeError::InvalidArgument`] before touching the OS when
/// `protected` is empty. OS failures are reported as `Ok(false)` so the caller
/// can fall back to [`minimize_processes`]. All minimizes are issued before
/// any restore.
pub fn show_desktop_except(
    backend: &dyn DesktopBackend,
    ctx: &MinimizeContext,
    protected: &[AppRef],
) -> Result<bool, MinimizeError> {
    if protected.is_empty() {
        return Err(MinimizeError::InvalidArgument {
            message: "protected set is empty; refusing to minimize every window".to_string(),
        });
    }

    info!(
        event = "core.minimize.show_desktop_started",
        protected = protected.len(),
        backend = backend.name()
    );

    let windows = match backend.windows() {
        Ok(windows) => windows,
        Err(e) => {
            warn!(
                event = "core.minimize.enumeration_failed",
                error = %e
            );
            return Ok(false);
        }
    };

    let plan = plan_show_desktop(&windows, protected, ctx);
    debug!(
        event = "core.minimize.plan_built",
        minimize = plan.minimize.len(),
        restore = plan.restore.len(),
        skipped = plan.skipped
    );

    let mut success = true;

    if !plan.minimize.is_empty()
        && let Err(e) = backend.minimize_windows(&plan.minimize)
    {
        warn!(
            event = "core.minimize.minimize_failed",
            count = plan.minimize.len(),
            error = %e
        );
        success = false;
    }

    // Restore even after a failed minimize so protected windows come back.
    if !plan.restore.is_empty()
        && let Err(e) = backend.restore_windows(&plan.restore)
    {
        warn!(
            event = "core.minimize.restore_failed",
            count = plan.restore.len(),
            error = %e
        );
        success = false;
    }

    info!(
        event = "core.minimize.show_desktop_completed",
        success,
        minimized = plan.minimize.len(),
        restored = plan.restore.len()
    );
    Ok(success)
}

/// Numeric entry point for callers still holding legacy mixed id lists.
pub fn show_desktop_except_ids(
    backend: &dyn DesktopBackend,
    ctx: &MinimizeContext,
    ids: &[u64],
) -> Result<bool, MinimizeError> {
    let refs: Vec<AppRef> = ids.iter().map(|&id| AppRef::from_legacy(id)).collect();
    show_desktop_except(backend, ctx, &refs)
}

/// Keep only `pid` (and the host) on screen.
pub fn minimize_all_except(
    backend: &dyn DesktopBackend,
    ctx: &MinimizeContext,
    pid: u32,
) -> Result<bool, MinimizeError> {
    show_desktop_except(backend, ctx, &[AppRef::Process(pid)])
}

/// Minimize the main window of each process. Every pid is attempted once;
/// the result is true only if all of them succeeded.
pub fn minimize_processes(backend: &dyn DesktopBackend, pids: &[u32]) -> bool {
    let mut all_ok = true;
    for &pid in pids {
        let ok = match backend.minimize_main_window(pid) {
            Ok(minimized) => minimized,
            Err(e) => {
                warn!(
                    event = "core.minimize.process_minimize_failed",
                    pid,
                    error = %e
                );
                false
            }
        };
        if !ok {
            debug!(event = "core.minimize.process_not_minimized", pid);
        }
        all_ok &= ok;
    }

    info!(
        event = "core.minimize.processes_completed",
        count = pids.len(),
        success = all_ok
    );
    all_ok
}
