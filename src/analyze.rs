use crate::cert::{CertError, Certificate, KeyInfo};
use crate::fingerprint;

/// Pure test of an RSA modulus (big-endian bytes).
pub type Detector = fn(&[u8]) -> bool;

/// Applies a weak-key detector to the RSA key of a certificate.
#[derive(Clone, Copy)]
pub struct VulnerabilityAnalyzer {
    detector: Detector,
}

impl Default for VulnerabilityAnalyzer {
    fn default() -> Self {
        VulnerabilityAnalyzer {
            detector: fingerprint::is_vulnerable,
        }
    }
}

impl VulnerabilityAnalyzer {
    pub fn with_detector(detector: Detector) -> Self {
        VulnerabilityAnalyzer { detector }
    }

    /// Parse certificate bytes and test their public key.
    pub fn analyze(&self, bytes: &[u8]) -> Result<bool, CertError> {
        let cert = Certificate::from_bytes(bytes)?;
        Ok(self.analyze_certificate(&cert))
    }

    /// Non-RSA keys are never vulnerable.
    pub fn analyze_certificate(&self, cert: &Certificate) -> bool {
        match &cert.key {
            KeyInfo::Rsa { modulus } => (self.detector)(modulus),
            KeyInfo::Ec => false,
            KeyInfo::Other { algorithm } => {
                tracing::debug!("{}: key algorithm {} is not RSA", cert.serial, algorithm);
                false
            }
        }
    }
}
