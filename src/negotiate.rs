// Two-phase buffer negotiation for native calls with variable-size output.
//
// The native contract is: call once without a buffer to learn the item count, allocate, then call
// again with the buffer and its capacity.  The announced count is advisory:
//
// - if the second call returns fewer items the result is truncated to what was written;
// - if it reports more items than fit (a larger count, or INSUFFICIENT_SIZE) the whole protocol
//   is run once more, and if the count is still inconsistent the call fails with Resource.

use crate::error::{check_smi, Error, Result};
use crate::smiapi::{SmiAPI, SmiStatus, RSMI_STATUS_INSUFFICIENT_SIZE, RSMI_STATUS_SUCCESS};

pub const MAX_RETRIES: usize = 1;

pub fn two_phase<T: Default + Clone>(
    smi: &dyn SmiAPI,
    op: &str,
    mut call: impl FnMut(Option<&mut [T]>, &mut u32) -> SmiStatus,
) -> Result<Vec<T>> {
    let mut announced: u32 = 0;
    check_smi(smi, op, call(None, &mut announced))?;
    for attempt in 0..=MAX_RETRIES {
        if announced == 0 {
            return Ok(vec![]);
        }
        let mut buf = vec![T::default(); announced as usize];
        let mut written = announced;
        let status = call(Some(&mut buf), &mut written);
        let overflowed = status == RSMI_STATUS_INSUFFICIENT_SIZE
            || (status == RSMI_STATUS_SUCCESS && written > announced);
        if !overflowed {
            check_smi(smi, op, status)?;
            buf.truncate(written as usize);
            return Ok(buf);
        }
        log::debug!("{op}: announced {announced} items, native layer has {written} (attempt {attempt})");
        if attempt == MAX_RETRIES {
            break;
        }
        if status == RSMI_STATUS_SUCCESS {
            announced = written;
        } else {
            announced = 0;
            check_smi(smi, op, call(None, &mut announced))?;
        }
    }
    Err(Error::resource(op, "item count kept changing between calls"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mockdcu;
    use std::cell::Cell;

    // A native list whose length is `sizes[k]` on the k'th call.
    fn fake_list(sizes: &[u32], calls: &Cell<usize>, buf: Option<&mut [u32]>, n: &mut u32) -> SmiStatus {
        let k = calls.get();
        calls.set(k + 1);
        let have = sizes[k.min(sizes.len() - 1)];
        match buf {
            None => {
                *n = have;
                RSMI_STATUS_SUCCESS
            }
            Some(b) => {
                let fit = have.min(*n);
                for i in 0..fit as usize {
                    b[i] = i as u32 + 100;
                }
                if have > *n {
                    *n = have;
                    RSMI_STATUS_INSUFFICIENT_SIZE
                } else {
                    *n = have;
                    RSMI_STATUS_SUCCESS
                }
            }
        }
    }

    #[test]
    pub fn test_stable_count() {
        let smi = mockdcu::Builder::new().with_devices(1).freeze_smi();
        let calls = Cell::new(0);
        let v = two_phase(&smi, "list", |b, n| fake_list(&[3], &calls, b, n)).unwrap();
        assert!(v == vec![100, 101, 102]);
        assert!(calls.get() == 2);
    }

    #[test]
    pub fn test_shrinks() {
        let smi = mockdcu::Builder::new().with_devices(1).freeze_smi();
        let calls = Cell::new(0);
        let v = two_phase(&smi, "list", |b, n| fake_list(&[3, 1], &calls, b, n)).unwrap();
        assert!(v == vec![100]);
    }

    #[test]
    pub fn test_grows_once() {
        let smi = mockdcu::Builder::new().with_devices(1).freeze_smi();
        let calls = Cell::new(0);
        let v = two_phase(&smi, "list", |b, n| fake_list(&[2, 4, 4, 4], &calls, b, n)).unwrap();
        assert!(v.len() == 4);
        assert!(calls.get() == 4);
    }

    #[test]
    pub fn test_keeps_growing() {
        let smi = mockdcu::Builder::new().with_devices(1).freeze_smi();
        let calls = Cell::new(0);
        let e = two_phase(&smi, "list", |b, n| fake_list(&[1, 2, 3, 4, 5], &calls, b, n))
            .unwrap_err();
        assert!(e.kind == ErrorKind::Resource);
        assert!(e.message.starts_with("list:"));
    }

    #[test]
    pub fn test_empty() {
        let smi = mockdcu::Builder::new().with_devices(1).freeze_smi();
        let calls = Cell::new(0);
        let v = two_phase(&smi, "list", |b, n| fake_list(&[0], &calls, b, n)).unwrap();
        assert!(v.is_empty());
        assert!(calls.get() == 1);
    }
}
