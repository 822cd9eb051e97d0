use staffroll_desktop::terminal::chain_panic_hook;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn panic_runs_restore_before_previous_hook() {
    let restored = Arc::new(AtomicBool::new(false));
    let restored_before_report = Arc::new(AtomicBool::new(false));

    {
        let restored = Arc::clone(&restored);
        let restored_before_report = Arc::clone(&restored_before_report);
        std::panic::set_hook(Box::new(move |_| {
            restored_before_report.store(restored.load(Ordering::SeqCst), Ordering::SeqCst);
        }));
    }
    {
        let restored = Arc::clone(&restored);
        chain_panic_hook(move || restored.store(true, Ordering::SeqCst));
    }

    let outcome = std::panic::catch_unwind(|| panic!("draw failed"));
    let _ = std::panic::take_hook();

    assert!(outcome.is_err());
    assert!(restored.load(Ordering::SeqCst));
    assert!(restored_before_report.load(Ordering::SeqCst));
}
