use digest::Digest;

/// Incremental hash state fed one chunk at a time.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter over any RustCrypto [`Digest`].
#[derive(Clone, Default)]
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;
pub type Md5Hasher = DigestHasher<md5::Md5>;

/// CRC-32C (Castagnoli). Finalizes to the checksum in big-endian byte order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32cHasher(u32);

impl Crc32cHasher {
    pub fn new() -> Self { Self(0) }

    pub fn digest(data: &[u8]) -> Vec<u8> { crc32c::crc32c(data).to_be_bytes().to_vec() }

    pub fn value(&self) -> u32 { self.0 }
}

impl Hasher for Crc32cHasher {
    fn update(&mut self, data: &[u8]) { self.0 = crc32c::crc32c_append(self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.to_be_bytes().to_vec() }
}
