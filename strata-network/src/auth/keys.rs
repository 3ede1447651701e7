use std::fmt;
use strata_formats::InvalidArgument;

/// length of a key in its Z85 text representation
pub const KEY_LENGTH: usize = 40;

/// the Z85 alphabet (ZeroMQ RFC 32)
const Z85_ALPHABET: &[u8; 85] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#";

/// an asymmetric key pair in Z85 text form
///
/// Keys are fixed-length opaque strings; the core validates their shape and
/// hands them to the transport's handshake layer, it never performs key
/// operations itself. The private key is treated as sensitive and is
/// excluded from the `Debug` rendering.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Keys {
    public_key: Option<String>,
    private_key: Option<String>,
    metadata: Option<String>,
}

fn check_key(key: &str) -> Result<(), InvalidArgument> {
    if key.len() != KEY_LENGTH {
        return Err(InvalidArgument::new(format!(
            "key must be {} characters, got {}",
            KEY_LENGTH,
            key.len()
        )));
    }
    if key.bytes().any(|b| !Z85_ALPHABET.contains(&b)) {
        return Err(InvalidArgument::new(
            "key contains characters outside the Z85 alphabet",
        ));
    }
    Ok(())
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the public half; must be 40 characters of Z85 text
    pub fn set_public_key(&mut self, key: &str) -> Result<(), InvalidArgument> {
        check_key(key)?;
        self.public_key = Some(key.to_string());
        Ok(())
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// set the private half; must be 40 characters of Z85 text
    pub fn set_private_key(&mut self, key: &str) -> Result<(), InvalidArgument> {
        check_key(key)?;
        self.private_key = Some(key.to_string());
        Ok(())
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    /// free form annotation, e.g. who the key belongs to and since when
    pub fn set_metadata(&mut self, metadata: impl Into<String>) {
        self.metadata = Some(metadata.into());
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn have_public_key(&self) -> bool {
        self.public_key.is_some()
    }

    pub fn have_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// both halves of the pair are present
    pub fn is_complete(&self) -> bool {
        self.have_public_key() && self.have_private_key()
    }

    /// reset every field to its default
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // the well-known test vectors from ZeroMQ RFC 31
    pub(crate) const PUBLIC: &str = "Yne@$w-vo<fVvi]a<NY6T1ed:M$fCG*[IaLV{hID";
    pub(crate) const PRIVATE: &str = "D:)Q[IlAW!ahhC2ac:9*A}h:p?([4%wOTJ%JR%cs";

    #[test]
    fn accepts_well_formed_keys() {
        let mut keys = Keys::new();
        keys.set_public_key(PUBLIC).unwrap();
        keys.set_private_key(PRIVATE).unwrap();
        keys.set_metadata("acq01 operator key, issued 2021-09");

        assert!(keys.is_complete());
        assert_eq!(keys.public_key(), Some(PUBLIC));
        assert_eq!(keys.private_key(), Some(PRIVATE));
    }

    #[test]
    fn rejects_wrong_length() {
        let mut keys = Keys::new();
        assert!(keys.set_public_key("tooshort").is_err());
        assert!(keys
            .set_public_key(&format!("{}extra", PUBLIC))
            .is_err());
        assert!(!keys.have_public_key());
    }

    #[test]
    fn rejects_characters_outside_z85() {
        let mut keys = Keys::new();
        // a comma is not in the Z85 alphabet
        let bad = format!("{},{}", &PUBLIC[..20], &PUBLIC[21..40]);
        assert_eq!(bad.len(), KEY_LENGTH);
        assert!(keys.set_public_key(&bad).is_err());
    }

    #[test]
    fn debug_never_shows_the_private_key() {
        let mut keys = Keys::new();
        keys.set_public_key(PUBLIC).unwrap();
        keys.set_private_key(PRIVATE).unwrap();

        let rendered = format!("{:?}", keys);
        assert!(!rendered.contains(PRIVATE));
    }
}
