use std::sync::atomic::{AtomicBool, Ordering};

// Signal handling for the event poll loop.
//
// The loop runs until the operator stops it: SIGINT from the keyboard, or SIGTERM/SIGHUP from the
// OS or job control.  The handler only sets a flag; the loop checks is_interrupted() between polls
// and then leaves normally, so that the runtime is shut down on the way out.
//
// Call handle_interruptions() to establish handlers, then is_interrupted() to check whether signals
// have been received.

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn dcusmi_signal_handler(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

pub fn handle_interruptions() {
    unsafe {
        let nomask: libc::sigset_t = std::mem::zeroed();
        let action = libc::sigaction {
            sa_sigaction: dcusmi_signal_handler as usize,
            sa_mask: nomask,
            sa_flags: 0,
            sa_restorer: None,
        };
        for sig in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
            libc::sigaction(sig, &action, std::ptr::null_mut());
        }
    }
}

pub fn is_interrupted() -> bool {
    let flag = INTERRUPTED.load(Ordering::Relaxed);
    if flag {
        log::info!("interrupted, stopping");
    }
    flag
}
