//! Remaining-time rendering for derived records.
//!
//! Durations of a day or more render at whole-day granularity ("3 days");
//! shorter ones render hour/minute components with zero components omitted
//! ("5h, 10min"). Formatting goes through a fixed byte buffer because the
//! contract is `no_std`.

use crate::storage::SECONDS_PER_DAY;
use soroban_sdk::{Env, String};

const BUF_LEN: usize = 32;

fn push_str(buf: &mut [u8; BUF_LEN], len: usize, s: &str) -> usize {
    let bytes = s.as_bytes();
    buf[len..len + bytes.len()].copy_from_slice(bytes);
    len + bytes.len()
}

fn push_u64(buf: &mut [u8; BUF_LEN], mut len: usize, mut value: u64) -> usize {
    let mut digits = [0u8; 20];
    let mut count = 0;
    loop {
        digits[count] = b'0' + (value % 10) as u8;
        value /= 10;
        count += 1;
        if value == 0 {
            break;
        }
    }
    while count > 0 {
        count -= 1;
        buf[len] = digits[count];
        len += 1;
    }
    len
}

/// Render a remaining duration in seconds as a human-readable string.
pub fn prettify_seconds(env: &Env, secs: u64) -> String {
    let mut buf = [0u8; BUF_LEN];
    let mut len = 0;

    if secs >= SECONDS_PER_DAY {
        let days = secs / SECONDS_PER_DAY;
        len = push_u64(&mut buf, len, days);
        len = push_str(&mut buf, len, if days == 1 { " day" } else { " days" });
        return String::from_bytes(env, &buf[..len]);
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        len = push_u64(&mut buf, len, hours);
        len = push_str(&mut buf, len, "h");
    }
    if minutes > 0 {
        if len > 0 {
            len = push_str(&mut buf, len, ", ");
        }
        len = push_u64(&mut buf, len, minutes);
        len = push_str(&mut buf, len, "min");
    }
    if len == 0 {
        len = push_str(&mut buf, len, "0min");
    }
    String::from_bytes(env, &buf[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(env: &Env, secs: u64) -> String {
        prettify_seconds(env, secs)
    }

    #[test]
    fn test_whole_days() {
        let env = Env::default();
        assert_eq!(pretty(&env, 3 * SECONDS_PER_DAY), String::from_str(&env, "3 days"));
        assert_eq!(pretty(&env, SECONDS_PER_DAY), String::from_str(&env, "1 day"));
        // Whole-day granularity: the partial day is dropped.
        assert_eq!(
            pretty(&env, 2 * SECONDS_PER_DAY + 3600),
            String::from_str(&env, "2 days")
        );
    }

    #[test]
    fn test_sub_day_components() {
        let env = Env::default();
        assert_eq!(pretty(&env, 5 * 3600 + 10 * 60), String::from_str(&env, "5h, 10min"));
        assert_eq!(pretty(&env, 2 * 3600), String::from_str(&env, "2h"));
        assert_eq!(pretty(&env, 45 * 60), String::from_str(&env, "45min"));
    }

    #[test]
    fn test_zero_and_sub_minute() {
        let env = Env::default();
        assert_eq!(pretty(&env, 0), String::from_str(&env, "0min"));
        assert_eq!(pretty(&env, 59), String::from_str(&env, "0min"));
    }
}
