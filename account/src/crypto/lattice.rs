//! # Lattice Signatures
//!
//! Post-quantum signing through an external Dilithium implementation.
//!
//! We don't implement Dilithium. We call one. The reference build from
//! pq-crystals exposes three C functions (keypair, sign, open) over raw
//! buffers, and this module is the narrow, typed boundary around them:
//!
//! ```text
//! LatticePrimitive  — the raw ABI: buffers in, status code out, plus its gate
//!   └─ DylibPrimitive — resolved from a shared library at startup
//! LatticeEngine     — lengths, status codes, and taking the gate
//! ```
//!
//! ## The gate
//!
//! The reference implementation keeps RNG state in globals, so unless the
//! configured primitive is declared re-entrant, every call goes through a
//! single mutex owned by the primitive handle itself. Any number of engines
//! may wrap the same handle; they all queue on the one gate. Verification is
//! read-only on our side but still enters the library, so it takes the gate
//! too.
//!
//! ## Signed-message framing
//!
//! The reference `sign` writes `signature ‖ message` into one buffer and
//! `open` expects the same framing back. The engine hides that: callers see
//! a bare signature and a boolean.

use std::fmt;
use std::os::raw::c_int;
use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::keys::LatticeKeypair;
use super::signatures::LatticeSignature;
use crate::config::LatticeConfig;
use crate::error::{AccountError, Result};

/// Byte lengths of a lattice parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeParams {
    /// Public key length.
    pub public_key_bytes: usize,
    /// Secret key length.
    pub secret_key_bytes: usize,
    /// Maximum signature length.
    pub signature_bytes: usize,
}

impl LatticeParams {
    /// Whether `keypair` output buffers are large enough.
    pub fn fits_keypair(&self, pk_len: usize, sk_len: usize) -> bool {
        pk_len >= self.public_key_bytes && sk_len >= self.secret_key_bytes
    }

    /// Whether `sign` buffers are large enough for a `message_len` message.
    pub fn fits_sign(&self, sm_len: usize, message_len: usize, sk_len: usize) -> bool {
        sk_len >= self.secret_key_bytes
            && self
                .signature_bytes
                .checked_add(message_len)
                .map_or(false, |needed| sm_len >= needed)
    }

    /// Whether `open` buffers are large enough for a signed message of `sm_len`.
    pub fn fits_open(&self, m_len: usize, sm_len: usize, pk_len: usize) -> bool {
        pk_len >= self.public_key_bytes && m_len >= sm_len
    }
}

impl From<&LatticeConfig> for LatticeParams {
    fn from(config: &LatticeConfig) -> Self {
        Self {
            public_key_bytes: config.public_key_bytes,
            secret_key_bytes: config.secret_key_bytes,
            signature_bytes: config.signature_bytes,
        }
    }
}

/// The raw lattice signature ABI.
///
/// Mirrors the reference C API one-to-one: status codes are returned as-is
/// (zero is success) and buffers are caller-allocated. Implementations must
/// return a non-zero status, without touching memory, when a buffer is
/// shorter than [`LatticeParams`] requires.
pub trait LatticePrimitive: Send + Sync + fmt::Debug {
    /// Byte lengths of the parameter set this primitive implements.
    fn params(&self) -> LatticeParams;

    /// Whether the primitive may be entered from several threads at once.
    fn is_reentrant(&self) -> bool {
        false
    }

    /// The exclusive gate every caller takes when the primitive is not
    /// re-entrant. Owned by the primitive, so all engines over it share it.
    fn gate(&self) -> &Mutex<()>;

    /// Fills `pk` and `sk` with a fresh key pair.
    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> c_int;

    /// Writes `signature ‖ message` into `sm` and its length into `smlen`.
    fn sign(&self, sm: &mut [u8], smlen: &mut usize, message: &[u8], sk: &[u8]) -> c_int;

    /// Verifies `sm` under `pk`, writing the embedded message into `m`.
    fn open(&self, m: &mut [u8], mlen: &mut usize, sm: &[u8], pk: &[u8]) -> c_int;
}

// ---------------------------------------------------------------------------
// DylibPrimitive
// ---------------------------------------------------------------------------

/// Status returned without entering the library when a buffer is too short.
pub const BUFFER_TOO_SMALL: c_int = -2;

type KeypairFn = unsafe extern "C" fn(pk: *mut u8, sk: *mut u8) -> c_int;
type SignFn =
    unsafe extern "C" fn(sm: *mut u8, smlen: *mut usize, m: *const u8, mlen: usize, sk: *const u8) -> c_int;
type OpenFn =
    unsafe extern "C" fn(m: *mut u8, mlen: *mut usize, sm: *const u8, smlen: usize, pk: *const u8) -> c_int;

/// A lattice primitive resolved from a shared library.
pub struct DylibPrimitive {
    keypair_fn: KeypairFn,
    sign_fn: SignFn,
    open_fn: OpenFn,
    params: LatticeParams,
    reentrant: bool,
    gate: Mutex<()>,
    // Keeps the symbols above valid. Declared last so it drops last.
    _lib: Library,
}

impl DylibPrimitive {
    /// Loads the library described by `config` and resolves its three symbols.
    ///
    /// Any failure (missing file, missing symbol) is a
    /// [`AccountError::PrimitiveFailure`].
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers, and the resolved symbols are
    /// called with the reference Dilithium signatures and the buffer lengths
    /// in `config`. The caller must ensure `config.library_path` names a
    /// build of that API whose parameter set matches those lengths.
    pub unsafe fn load(config: &LatticeConfig) -> Result<Self> {
        let lib = Library::new(&config.library_path)
            .map_err(|e| load_failure(&config.library_path, e))?;

        let prefix = &config.symbol_prefix;
        // The fn pointers are copied out and stay valid for as long as `lib`
        // is held.
        let (keypair_fn, sign_fn, open_fn) = {
            let keypair: KeypairFn = *lib
                .get::<KeypairFn>(format!("{}_keypair\0", prefix).as_bytes())
                .map_err(|e| load_failure(&config.library_path, e))?;
            let sign: SignFn = *lib
                .get::<SignFn>(format!("{}\0", prefix).as_bytes())
                .map_err(|e| load_failure(&config.library_path, e))?;
            let open: OpenFn = *lib
                .get::<OpenFn>(format!("{}_open\0", prefix).as_bytes())
                .map_err(|e| load_failure(&config.library_path, e))?;
            (keypair, sign, open)
        };

        debug!(path = %config.library_path.display(), prefix = %prefix, "lattice primitive loaded");

        Ok(Self {
            keypair_fn,
            sign_fn,
            open_fn,
            params: LatticeParams::from(config),
            reentrant: config.reentrant,
            gate: Mutex::new(()),
            _lib: lib,
        })
    }
}

fn load_failure(path: &Path, err: libloading::Error) -> AccountError {
    warn!(path = %path.display(), error = %err, "lattice primitive unavailable");
    AccountError::PrimitiveFailure(format!("{}: {}", path.display(), err))
}

impl fmt::Debug for DylibPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DylibPrimitive")
            .field("params", &self.params)
            .field("reentrant", &self.reentrant)
            .finish_non_exhaustive()
    }
}

impl LatticePrimitive for DylibPrimitive {
    fn params(&self) -> LatticeParams {
        self.params
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    fn gate(&self) -> &Mutex<()> {
        &self.gate
    }

    fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> c_int {
        if !self.params.fits_keypair(pk.len(), sk.len()) {
            return BUFFER_TOO_SMALL;
        }
        // SAFETY: both buffers hold at least the lengths the library writes.
        unsafe { (self.keypair_fn)(pk.as_mut_ptr(), sk.as_mut_ptr()) }
    }

    fn sign(&self, sm: &mut [u8], smlen: &mut usize, message: &[u8], sk: &[u8]) -> c_int {
        if !self.params.fits_sign(sm.len(), message.len(), sk.len()) {
            return BUFFER_TOO_SMALL;
        }
        // SAFETY: `sm` holds signature_bytes + message.len() bytes, `sk` is a
        // full secret key.
        unsafe {
            (self.sign_fn)(
                sm.as_mut_ptr(),
                smlen,
                message.as_ptr(),
                message.len(),
                sk.as_ptr(),
            )
        }
    }

    fn open(&self, m: &mut [u8], mlen: &mut usize, sm: &[u8], pk: &[u8]) -> c_int {
        if !self.params.fits_open(m.len(), sm.len(), pk.len()) {
            return BUFFER_TOO_SMALL;
        }
        // SAFETY: `m` is at least as long as `sm`, `pk` is a full public key.
        unsafe { (self.open_fn)(m.as_mut_ptr(), mlen, sm.as_ptr(), sm.len(), pk.as_ptr()) }
    }
}

// ---------------------------------------------------------------------------
// LatticeEngine
// ---------------------------------------------------------------------------

/// Process-wide handle to a lattice primitive.
///
/// Cheap to clone; clones share the primitive and therefore its gate. Build
/// one at startup and hand it to whoever needs it.
#[derive(Clone)]
pub struct LatticeEngine {
    primitive: Arc<dyn LatticePrimitive>,
}

impl LatticeEngine {
    /// Wraps an already-resolved primitive.
    pub fn new(primitive: Arc<dyn LatticePrimitive>) -> Self {
        Self { primitive }
    }

    /// Loads the shared library named by `config`.
    ///
    /// The configured path is the operator's statement that it names a
    /// reference Dilithium build with the configured lengths.
    pub fn from_config(config: &LatticeConfig) -> Result<Self> {
        // SAFETY: see above; `config` is the trust boundary for the library.
        let primitive = unsafe { DylibPrimitive::load(config)? };
        Ok(Self::new(Arc::new(primitive)))
    }

    /// Byte lengths of the underlying parameter set.
    pub fn params(&self) -> LatticeParams {
        self.primitive.params()
    }

    /// Generates a fresh key pair.
    pub fn generate_keypair(&self) -> Result<LatticeKeypair> {
        let params = self.params();
        let mut pk = vec![0u8; params.public_key_bytes];
        let mut sk = vec![0u8; params.secret_key_bytes];

        let status = self.gated(|p| p.keypair(&mut pk, &mut sk));
        check_status("keypair", status)?;

        LatticeKeypair::from_bytes(pk, sk, params.public_key_bytes, params.secret_key_bytes)
    }

    /// Signs `message` with the secret half of `keypair`.
    pub fn sign(&self, message: &[u8], keypair: &LatticeKeypair) -> Result<LatticeSignature> {
        let params = self.params();
        if keypair.secret_key().len() != params.secret_key_bytes {
            return Err(AccountError::malformed(
                "secretKey",
                format!(
                    "expected {} bytes, got {}",
                    params.secret_key_bytes,
                    keypair.secret_key().len()
                ),
            ));
        }

        let mut sm = vec![0u8; params.signature_bytes + message.len()];
        let mut smlen = 0usize;
        let status = self.gated(|p| p.sign(&mut sm, &mut smlen, message, keypair.secret_key()));
        check_status("sign", status)?;

        if smlen < message.len() || smlen > sm.len() {
            return Err(AccountError::PrimitiveFailure(format!(
                "sign reported {} bytes for a {}-byte message",
                smlen,
                message.len()
            )));
        }

        let sig_len = smlen - message.len();
        Ok(LatticeSignature::new(sm[..sig_len].to_vec()))
    }

    /// Verifies `signature` over `message` under `public_key`.
    ///
    /// Returns `Ok(false)` for a signature that simply doesn't verify; `Err`
    /// is reserved for inputs that can't be checked at all.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &LatticeSignature,
        public_key: &[u8],
    ) -> Result<bool> {
        let params = self.params();
        if public_key.len() != params.public_key_bytes {
            return Err(AccountError::malformed(
                "publicKey",
                format!(
                    "expected {} bytes, got {}",
                    params.public_key_bytes,
                    public_key.len()
                ),
            ));
        }
        if signature.len() > params.signature_bytes {
            return Ok(false);
        }

        let mut sm = Vec::with_capacity(signature.len() + message.len());
        sm.extend_from_slice(signature.as_bytes());
        sm.extend_from_slice(message);

        let mut opened = vec![0u8; sm.len()];
        let mut opened_len = 0usize;
        let status = self.gated(|p| p.open(&mut opened, &mut opened_len, &sm, public_key));

        Ok(status == 0 && opened_len == message.len() && &opened[..opened_len] == message)
    }

    fn gated<T>(&self, call: impl FnOnce(&dyn LatticePrimitive) -> T) -> T {
        if self.primitive.is_reentrant() {
            call(self.primitive.as_ref())
        } else {
            let _guard = self.primitive.gate().lock();
            call(self.primitive.as_ref())
        }
    }
}

impl fmt::Debug for LatticeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatticeEngine")
            .field("primitive", &self.primitive)
            .finish()
    }
}

fn check_status(operation: &str, status: c_int) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        warn!(operation, status, "lattice primitive reported failure");
        Err(AccountError::PrimitiveFailure(format!(
            "{} returned status {}",
            operation, status
        )))
    }
}

/// In-process stand-in for the native library.
///
/// Not Dilithium, not secure, not even trying. It honours the reference ABI
/// (buffer sizes, `sig ‖ msg` framing, status codes) so the engine and the
/// facade can be exercised without a native build.
#[cfg(test)]
pub(crate) mod fake {
    use std::os::raw::c_int;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::{LatticeParams, LatticePrimitive};
    use crate::crypto::hash::keccak;

    pub(crate) const PK_BYTES: usize = 64;
    pub(crate) const SK_BYTES: usize = 96;
    pub(crate) const SIG_BYTES: usize = 48;

    #[derive(Debug, Default)]
    pub(crate) struct FakePrimitive {
        counter: AtomicUsize,
        in_flight: AtomicBool,
        pub(crate) overlapped: AtomicBool,
        pub(crate) fail_sign: bool,
        pub(crate) reentrant: bool,
        gate: Mutex<()>,
    }

    impl FakePrimitive {
        /// A primitive whose `sign` always reports failure.
        pub(crate) fn failing() -> Self {
            Self {
                fail_sign: true,
                ..Self::default()
            }
        }

        fn enter(&self) {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            std::thread::yield_now();
        }

        fn leave(&self) {
            self.in_flight.store(false, Ordering::SeqCst);
        }

        fn tag(pk: &[u8], message: &[u8]) -> Vec<u8> {
            let mut buf = pk.to_vec();
            buf.extend_from_slice(message);
            let digest = keccak(&buf);
            digest.iter().cycle().take(SIG_BYTES).copied().collect()
        }
    }

    impl LatticePrimitive for FakePrimitive {
        fn params(&self) -> LatticeParams {
            LatticeParams {
                public_key_bytes: PK_BYTES,
                secret_key_bytes: SK_BYTES,
                signature_bytes: SIG_BYTES,
            }
        }

        fn is_reentrant(&self) -> bool {
            self.reentrant
        }

        fn gate(&self) -> &Mutex<()> {
            &self.gate
        }

        fn keypair(&self, pk: &mut [u8], sk: &mut [u8]) -> c_int {
            self.enter();
            let n = self.counter.fetch_add(1, Ordering::SeqCst) as u64;
            let seed = keccak(&n.to_be_bytes());
            for (i, b) in pk.iter_mut().enumerate() {
                *b = seed[i % 32] ^ (i as u8);
            }
            // Like the real thing, the secret key embeds the public key.
            sk[..PK_BYTES].copy_from_slice(pk);
            sk[PK_BYTES..].fill(0xA5);
            self.leave();
            0
        }

        fn sign(&self, sm: &mut [u8], smlen: &mut usize, message: &[u8], sk: &[u8]) -> c_int {
            if self.fail_sign {
                return -1;
            }
            self.enter();
            let sig = Self::tag(&sk[..PK_BYTES], message);
            sm[..SIG_BYTES].copy_from_slice(&sig);
            sm[SIG_BYTES..SIG_BYTES + message.len()].copy_from_slice(message);
            *smlen = SIG_BYTES + message.len();
            self.leave();
            0
        }

        fn open(&self, m: &mut [u8], mlen: &mut usize, sm: &[u8], pk: &[u8]) -> c_int {
            self.enter();
            let ok = sm.len() >= SIG_BYTES && sm[..SIG_BYTES] == Self::tag(pk, &sm[SIG_BYTES..])[..];
            let status = if ok {
                let body = &sm[SIG_BYTES..];
                m[..body.len()].copy_from_slice(body);
                *mlen = body.len();
                0
            } else {
                -1
            };
            self.leave();
            status
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::fake::{FakePrimitive, PK_BYTES, SIG_BYTES, SK_BYTES};
    use super::*;

    fn engine() -> LatticeEngine {
        LatticeEngine::new(Arc::new(FakePrimitive::default()))
    }

    #[test]
    fn test_keypair_has_configured_lengths() {
        let pair = engine().generate_keypair().unwrap();
        assert_eq!(pair.public_key().len(), PK_BYTES);
        assert_eq!(pair.secret_key().len(), SK_BYTES);
    }

    #[test]
    fn test_sign_and_verify() {
        let engine = engine();
        let pair = engine.generate_keypair().unwrap();
        let sig = engine.sign(b"quantum-safe hello", &pair).unwrap();
        assert_eq!(sig.len(), SIG_BYTES);
        assert!(engine
            .verify(b"quantum-safe hello", &sig, pair.public_key())
            .unwrap());
    }

    #[test]
    fn test_verify_rejects_other_message_and_key() {
        let engine = engine();
        let pair = engine.generate_keypair().unwrap();
        let other = engine.generate_keypair().unwrap();
        let sig = engine.sign(b"original", &pair).unwrap();

        assert!(!engine.verify(b"tampered", &sig, pair.public_key()).unwrap());
        assert!(!engine.verify(b"original", &sig, other.public_key()).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_public_key_length() {
        let engine = engine();
        let pair = engine.generate_keypair().unwrap();
        let sig = engine.sign(b"m", &pair).unwrap();
        let err = engine.verify(b"m", &sig, &[0u8; 3]).unwrap_err();
        assert!(matches!(err, AccountError::MalformedField { .. }));
    }

    #[test]
    fn test_sign_failure_status_is_primitive_failure() {
        let engine = LatticeEngine::new(Arc::new(FakePrimitive::failing()));
        let pair = engine.generate_keypair().unwrap();
        let err = engine.sign(b"doomed", &pair).unwrap_err();
        assert!(matches!(err, AccountError::PrimitiveFailure(_)));
    }

    #[test]
    fn test_sign_rejects_foreign_secret_key() {
        let engine = engine();
        let pair = LatticeKeypair::from_bytes(vec![0; 4], vec![0; 4], 4, 4).unwrap();
        assert!(matches!(
            engine.sign(b"m", &pair),
            Err(AccountError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_missing_library_is_primitive_failure() {
        let config = LatticeConfig::dilithium2("/nonexistent/libpqcrystals_dilithium2_ref.so");
        let err = LatticeEngine::from_config(&config).unwrap_err();
        assert!(matches!(err, AccountError::PrimitiveFailure(_)));
    }

    #[test]
    fn test_gate_serialises_non_reentrant_primitive() {
        let primitive = Arc::new(FakePrimitive::default());
        let engine = LatticeEngine::new(primitive.clone());
        let pair = engine.generate_keypair().unwrap();

        std::thread::scope(|scope| {
            for t in 0..8u8 {
                let engine = engine.clone();
                let pair = pair.clone();
                scope.spawn(move || {
                    for i in 0..50u8 {
                        let msg = [t, i];
                        let sig = engine.sign(&msg, &pair).unwrap();
                        assert!(engine.verify(&msg, &sig, pair.public_key()).unwrap());
                    }
                });
            }
        });

        assert!(!primitive.overlapped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_engines_over_one_primitive_share_its_gate() {
        let primitive = Arc::new(FakePrimitive::default());
        let first = LatticeEngine::new(primitive.clone());
        let second = LatticeEngine::new(primitive.clone());
        let pair = first.generate_keypair().unwrap();

        std::thread::scope(|scope| {
            for t in 0..8u8 {
                let engine = if t % 2 == 0 { first.clone() } else { second.clone() };
                let pair = pair.clone();
                scope.spawn(move || {
                    for i in 0..50u8 {
                        let msg = [t, i];
                        let sig = engine.sign(&msg, &pair).unwrap();
                        assert!(engine.verify(&msg, &sig, pair.public_key()).unwrap());
                    }
                });
            }
        });

        assert!(!primitive.overlapped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_buffer_fit_checks() {
        let params = LatticeParams::from(&LatticeConfig::dilithium2("/unused"));
        assert!(params.fits_keypair(1312, 2544));
        assert!(!params.fits_keypair(1, 1));
        assert!(!params.fits_keypair(1312, 2543));

        assert!(params.fits_sign(2420 + 5, 5, 2544));
        assert!(!params.fits_sign(2420 + 4, 5, 2544));
        assert!(!params.fits_sign(2425, 5, 1));
        assert!(!params.fits_sign(usize::MAX, usize::MAX, 2544));

        assert!(params.fits_open(10, 10, 1312));
        assert!(!params.fits_open(9, 10, 1312));
        assert!(!params.fits_open(10, 10, 1311));
    }
}
