use chrono::Utc;
use rand::Rng;

use models::Record;

/// Key produced when a record has neither an API name nor a link.
pub const DEGENERATE_KEY: &str = "::";

/// Natural key of a record: `"{API}::{Link}"`, missing parts as empty strings.
pub fn derive_key(record: &Record) -> String {
    format!(
        "{}::{}",
        record.api.as_deref().unwrap_or(""),
        record.link.as_deref().unwrap_or("")
    )
}

/// Random identifier: base-36 random digits followed by the base-36
/// millisecond timestamp.
pub fn random_id() -> String {
    let mut rng = rand::thread_rng();
    let random: u64 = rng.gen_range(36u64.pow(10)..36u64.pow(11));
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", to_base36(random), to_base36(millis))
}

/// Give `record` an identifier if it has none: the natural key when it is
/// meaningful, otherwise a random one. An existing non-empty id is kept.
pub fn assign_id(mut record: Record) -> Record {
    if record.id().is_none() {
        let key = derive_key(&record);
        record.id = Some(if key == DEGENERATE_KEY { random_id() } else { key });
    }
    record
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(api: Option<&str>, link: Option<&str>) -> Record {
        Record { api: api.map(Into::into), link: link.map(Into::into), ..Default::default() }
    }

    #[test]
    fn derive_key_is_stable() {
        let r = rec(Some("Foo"), Some("https://foo.test"));
        assert_eq!(derive_key(&r), "Foo::https://foo.test");
        assert_eq!(derive_key(&r), derive_key(&r.clone()));
        assert_eq!(derive_key(&rec(Some("Foo"), None)), "Foo::");
        assert_eq!(derive_key(&rec(None, None)), DEGENERATE_KEY);
    }

    #[test]
    fn assign_prefers_existing_then_natural_then_random() {
        let explicit = assign_id(rec(Some("Foo"), Some("l")).with_id("mine"));
        assert_eq!(explicit.id(), Some("mine"));

        let natural = assign_id(rec(Some("Foo"), Some("l")));
        assert_eq!(natural.id(), Some("Foo::l"));

        let blank_id = assign_id(rec(Some("Foo"), Some("l")).with_id(""));
        assert_eq!(blank_id.id(), Some("Foo::l"));

        let a = assign_id(rec(None, None));
        let b = assign_id(rec(None, None));
        let (a, b) = (a.id().unwrap_or_default().to_string(), b.id().unwrap_or_default().to_string());
        assert_ne!(a, DEGENERATE_KEY);
        assert_ne!(a, b);
    }

    #[test]
    fn random_ids_are_base36() {
        let id = random_id();
        assert!(id.len() >= 11);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
