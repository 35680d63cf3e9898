use std::ffi::CStr;

// Current local time as an ISO time stamp, yyyy-mm-ddThh:mm:ss+hhmm, for the metrics records.
//
// This goes through libc rather than a date crate:
//   t = time()
//   localtime_r(&t, timebuf)
//   strftime(strbuf, strbufsize, "%FT%T%z", timebuf)
//
// Neither call should fail.  If one does, the time is given as seconds since the epoch instead.

pub fn now_iso8601() -> String {
    // The all-zero tm is valid, tm_zone is a nullable pointer.
    let mut timebuf: libc::tm = unsafe { std::mem::zeroed() };
    const SIZE: usize = 32; // 25 needed
    let mut buffer = [0 as libc::c_char; SIZE];
    let t = unsafe { libc::time(std::ptr::null_mut()) };
    if unsafe { libc::localtime_r(&t, &mut timebuf) }.is_null() {
        log::warn!("localtime_r failed");
        return format!("{t}");
    }
    let format = b"%FT%T%z\0";
    // strftime returns 0 if the buffer is too small for the result + NUL.
    let n = unsafe { libc::strftime(buffer.as_mut_ptr(), SIZE, format.as_ptr() as *const libc::c_char, &timebuf) };
    if n == 0 {
        log::warn!("strftime failed");
        return format!("{t}");
    }
    unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[test]
pub fn test_isotime() {
    let t = now_iso8601();
    let ts = t.as_str().chars().collect::<Vec<char>>();
    let expect = "dddd-dd-ddTdd:dd:dd+dddd";
    assert!(ts.len() == expect.len());
    for (i, c) in expect.chars().enumerate() {
        match c {
            'd' => assert!(ts[i].is_ascii_digit()),
            '+' => assert!(ts[i] == '+' || ts[i] == '-'),
            _ => assert!(ts[i] == c),
        }
    }
}
