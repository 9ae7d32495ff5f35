//! Stable short identifiers for packed images.
//!
//! An identifier is a keyed hash of the image's source path, cut to 8 bytes and
//! rendered in base58 so it stays short enough to paste around. The key is a
//! fixed label baked into the binary: this is a naming scheme, not an
//! authentication mechanism.

use std::path::Path;

use hmac::{Hmac, Mac};
use sha2::Sha512_256;

type LabelMac = Hmac<Sha512_256>;

const LABEL_KEY: &[u8] = b"0x12F0E6D";
const ID_BYTES: usize = 8;

/// Derives the identifier for `path`. Same path, same identifier.
pub fn image_id(path: &Path) -> String {
    id_for_bytes(path.as_os_str().as_encoded_bytes())
}

fn id_for_bytes(bytes: &[u8]) -> String {
    let mut mac = LabelMac::new_from_slice(LABEL_KEY).expect("HMAC accepts keys of any length");
    mac.update(bytes);
    let digest = mac.finalize().into_bytes();
    bs58::encode(&digest[..ID_BYTES]).into_string()
}
