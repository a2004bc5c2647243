// ensure_no_std/src/main.rs
#![no_std]
#![no_main]

use core::panic::PanicInfo;
use cv_core::{FeatureMatch, KeyPoint};

/// This function is called on panic.
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    loop {}
}

#[no_mangle]
pub extern "C" fn _start() -> ! {
    let keypoint = KeyPoint::new(1, 2);
    let _ = FeatureMatch(keypoint, keypoint.offset(1, 1).unwrap_or(keypoint));
    loop {}
}
