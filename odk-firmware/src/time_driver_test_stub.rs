extern crate std;

use core::{cell::RefCell, task::Waker};
use embassy_time_driver::Driver;

struct TestTimeDriver;

impl Driver for TestTimeDriver {
    fn now(&self) -> u64 {
        NOW.with_borrow_mut(|now| {
            let t = now.0;
            now.0 += now.1;
            t
        })
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        NOW.with_borrow_mut(|now| {
            if at > now.0 {
                now.0 = at;
            }
        });

        waker.wake_by_ref();
    }
}

std::thread_local! {
    /// (current tick, ticks added after every read)
    static NOW: RefCell<(u64,u64)> = const {RefCell::new((0,0))};
}

embassy_time_driver::time_driver_impl!(static TIME_DRIVER: TestTimeDriver = TestTimeDriver);

pub fn set_time(t: u64) {
    NOW.with_borrow_mut(|now| now.0 = t);
}

/// Make time move forward by `t` ticks each time it is read. Busy waits need this to finish.
pub fn set_read_step(t: u64) {
    NOW.with_borrow_mut(|now| now.1 = t);
}
