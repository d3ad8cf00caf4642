use ring::rand::{SecureRandom, SystemRandom};
use tokengate_core::{Error, HeaderFault, Result, Token};

/// Generates tokens and pulls them back out of `Authorization` headers.
/// Never touches storage.
#[derive(Clone)]
pub struct TokenCodec {
    rng: SystemRandom,
    token_length: usize,
}

impl TokenCodec {
    pub fn new(token_length: usize) -> Self {
        Self {
            rng: SystemRandom::new(),
            token_length,
        }
    }

    pub fn token_length(&self) -> usize {
        self.token_length
    }

    pub fn token_chars(&self) -> usize {
        self.token_length * 2
    }

    pub fn generate(&self) -> Result<Token> {
        let mut random_bytes = vec![0u8; self.token_length];
        self.rng
            .fill(&mut random_bytes)
            .map_err(|_| Error::Generation("secure random source unavailable".into()))?;
        Ok(Token::from_hex(hex::encode(&random_bytes)))
    }

    /// Parses `<scheme> <token>`. The scheme is only required to be present.
    pub fn extract(&self, header: Option<&str>) -> Result<Token> {
        let header = header.ok_or(HeaderFault::Missing)?;

        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(HeaderFault::FieldCount(fields.len()).into());
        }

        let candidate = fields[1];
        if candidate.len() != self.token_chars() {
            return Err(HeaderFault::TokenLength {
                expected: self.token_chars(),
                actual: candidate.len(),
            }
            .into());
        }
        if !candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(HeaderFault::NotLowercaseHex.into());
        }

        Ok(Token::from_hex(candidate))
    }
}
