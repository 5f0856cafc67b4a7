use sha1::{Digest, Sha1};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, GeneralName, X509Certificate, X509Name};
use x509_parser::public_key::PublicKey;

/// Certificate bytes that could not be parsed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CertError {
    #[error("invalid PEM: {0}")]
    Pem(String),
    #[error("invalid DER certificate: {0}")]
    Der(String),
    #[error("invalid public key: {0}")]
    PublicKey(String),
}

/// Subject public key, reduced to what the scanner needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInfo {
    /// Big-endian modulus without leading zero bytes
    Rsa { modulus: Vec<u8> },
    Ec,
    Other { algorithm: String },
}

/// Parsed, owned view of a certificate file.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// `0x` + upper-case hex of the raw serial integer
    pub serial: String,
    /// SHA-1 thumbprint of the DER encoding, upper-case hex
    pub hash: String,
    /// Unix timestamps
    pub not_before: i64,
    pub not_after: i64,
    pub key: KeyInfo,
    /// Key size in bits
    pub key_length: usize,
    pub email: Option<String>,
    pub name: String,
    pub issuer: String,
    pub subject: String,
}

struct Fields {
    serial: String,
    not_before: i64,
    not_after: i64,
    key: KeyInfo,
    key_length: usize,
    email: Option<String>,
    name: String,
    issuer: String,
    subject: String,
}

const OID_EMAIL: &str = "1.2.840.113549.1.9.1";
const OID_COMMON_NAME: &str = "2.5.4.3";
const OID_ORGANIZATION: &str = "2.5.4.10";
const OID_ORGANIZATIONAL_UNIT: &str = "2.5.4.11";

const ATTRIBUTE_KEYS: &[(&str, &str)] = &[
    (OID_COMMON_NAME, "CN"),
    ("2.5.4.4", "SN"),
    ("2.5.4.5", "SERIALNUMBER"),
    ("2.5.4.6", "C"),
    ("2.5.4.7", "L"),
    ("2.5.4.8", "S"),
    ("2.5.4.9", "STREET"),
    (OID_ORGANIZATION, "O"),
    (OID_ORGANIZATIONAL_UNIT, "OU"),
    ("2.5.4.12", "T"),
    ("2.5.4.42", "G"),
    ("2.5.4.43", "I"),
    (OID_EMAIL, "E"),
    ("0.9.2342.19200300.100.1.25", "DC"),
];

impl Certificate {
    /// Parse PEM or DER certificate bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Certificate, CertError> {
        let der = to_der(data)?;
        let fields = {
            let (_, x509) =
                X509Certificate::from_der(&der).map_err(|e| CertError::Der(e.to_string()))?;
            extract_fields(&x509)?
        };
        let hash = hex::encode_upper(Sha1::digest(&der));
        Ok(Certificate {
            serial: fields.serial,
            hash,
            not_before: fields.not_before,
            not_after: fields.not_after,
            key: fields.key,
            key_length: fields.key_length,
            email: fields.email,
            name: fields.name,
            issuer: fields.issuer,
            subject: fields.subject,
        })
    }

    /// Part of the email address after `@`.
    pub fn domain(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split_once('@'))
            .map(|(_, domain)| domain)
    }
}

fn to_der(data: &[u8]) -> Result<Vec<u8>, CertError> {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    if data[start..].starts_with(b"-----BEGIN") {
        let (_, pem) = parse_x509_pem(&data[start..]).map_err(|e| CertError::Pem(e.to_string()))?;
        Ok(pem.contents)
    } else {
        Ok(data.to_vec())
    }
}

fn extract_fields(x509: &X509Certificate<'_>) -> Result<Fields, CertError> {
    let spki = x509.public_key();
    let parsed = spki
        .parsed()
        .map_err(|e| CertError::PublicKey(e.to_string()))?;
    let (key, key_length) = match parsed {
        PublicKey::RSA(rsa) => {
            let modulus = strip_leading_zeros(rsa.modulus);
            (
                KeyInfo::Rsa {
                    modulus: modulus.to_vec(),
                },
                bit_length(modulus),
            )
        }
        PublicKey::EC(_) => {
            let curve = spki
                .algorithm
                .parameters
                .as_ref()
                .and_then(|params| params.as_oid().ok())
                .map(|oid| oid.to_id_string());
            let bits = curve
                .as_deref()
                .and_then(named_curve_bits)
                .unwrap_or_else(|| point_field_bits(&spki.subject_public_key.data));
            (KeyInfo::Ec, bits)
        }
        _ => (
            KeyInfo::Other {
                algorithm: spki.algorithm.algorithm.to_id_string(),
            },
            0,
        ),
    };

    let subject = x509.subject();
    let email = find_attribute(subject, OID_EMAIL).or_else(|| san_email(x509));
    let name = find_attribute(subject, OID_COMMON_NAME)
        .or_else(|| find_attribute(subject, OID_ORGANIZATIONAL_UNIT))
        .or_else(|| find_attribute(subject, OID_ORGANIZATION))
        .or_else(|| email.clone())
        .unwrap_or_default();

    Ok(Fields {
        serial: format!("0x{}", hex::encode_upper(x509.raw_serial())),
        not_before: x509.validity().not_before.timestamp(),
        not_after: x509.validity().not_after.timestamp(),
        key,
        key_length,
        email,
        name,
        issuer: format_name(x509.issuer()),
        subject: format_name(subject),
    })
}

/// Field size of the named curves a CA is likely to issue.
fn named_curve_bits(oid: &str) -> Option<usize> {
    let bits = match oid {
        "1.2.840.10045.3.1.1" => 192,
        "1.3.132.0.33" => 224,
        "1.2.840.10045.3.1.7" | "1.3.132.0.10" | "1.3.36.3.3.2.8.1.1.7" => 256,
        "1.3.132.0.34" | "1.3.36.3.3.2.8.1.1.11" => 384,
        "1.3.36.3.3.2.8.1.1.13" => 512,
        "1.3.132.0.35" => 521,
        _ => return None,
    };
    Some(bits)
}

/// Byte-rounded field size from the encoded point, for unnamed curves.
fn point_field_bits(point: &[u8]) -> usize {
    // uncompressed point 04||X||Y, compressed 02/03||X
    let field_bytes = match point.first() {
        Some(0x04) => point.len().saturating_sub(1) / 2,
        _ => point.len().saturating_sub(1),
    };
    field_bytes * 8
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn bit_length(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(&first) => (bytes.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
        None => 0,
    }
}

fn attribute_value(attr: &x509_parser::x509::AttributeTypeAndValue<'_>) -> String {
    match attr.as_str() {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(attr.attr_value().as_bytes()).into_owned(),
    }
}

fn find_attribute(name: &X509Name<'_>, oid: &str) -> Option<String> {
    name.iter_attributes()
        .find(|attr| attr.attr_type().to_id_string() == oid)
        .map(attribute_value)
}

fn san_email(x509: &X509Certificate<'_>) -> Option<String> {
    let san = x509.subject_alternative_name().ok().flatten()?;
    san.value.general_names.iter().find_map(|gn| match gn {
        GeneralName::RFC822Name(email) => Some(email.to_string()),
        _ => None,
    })
}

/// `KEY=value, ...` with the most specific attribute first.
fn format_name(name: &X509Name<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for rdn in name.iter_rdn() {
        for attr in rdn.iter() {
            let oid = attr.attr_type().to_id_string();
            let key = ATTRIBUTE_KEYS
                .iter()
                .find(|(o, _)| *o == oid)
                .map(|(_, k)| k.to_string())
                .unwrap_or_else(|| format!("OID.{}", oid));
            parts.push(format!("{}={}", key, quote_value(&attribute_value(attr))));
        }
    }
    parts.reverse();
    parts.join(", ")
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.starts_with(' ')
        || value.ends_with(' ')
        || value.contains([',', '+', '=', '"', ';', '<', '>', '#']);
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
