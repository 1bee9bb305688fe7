//! Probe URL construction.
//!
//! The default probe target is a 1x1 image on a highly available host. A
//! random `zx` query parameter is attached so repeated probes are never
//! answered from a cache.

use std::sync::LazyLock;

use rand::Rng;
use url::Url;

/// Default probe resource, scheme chosen at probe time.
pub const DEFAULT_RESOURCE: &str = "https://www.google.com/images/cleardot.gif";

// Parsed once; infallible for the constant above.
static DEFAULT_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_RESOURCE).expect("DEFAULT_RESOURCE is an absolute URL"));

/// Query parameter carrying the uniqueness token.
pub const UNIQUE_PARAM: &str = "zx";

/// Build the default probe URL.
///
/// The scheme is `https` unless the prober runs on an insecure `http` origin.
pub fn default_probe_url(insecure_origin: bool) -> Url {
    let mut url = DEFAULT_URL.clone();
    if insecure_origin {
        // http <-> https never fails for a special-scheme URL.
        let _ = url.set_scheme("http");
    }
    make_unique(&mut url);
    url
}

/// Replace (or add) the `zx` parameter with a fresh random token.
pub fn make_unique(url: &mut Url) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != UNIQUE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    let token = random_token();
    let mut pairs = url.query_pairs_mut();
    for (key, value) in &kept {
        pairs.append_pair(key, value);
    }
    pairs.append_pair(UNIQUE_PARAM, &token);
}

/// Random lowercase base-36 token.
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let mut token = to_base36(rng.gen_range(0..(1u64 << 31)));
    token.push_str(&to_base36(rng.gen_range(0..(1u64 << 31))));
    token
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
