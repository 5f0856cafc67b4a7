/// Certificate search form of the CA public directory
pub const DEFAULT_PORTAL_ENDPOINT: &str = "https://www.postsignum.cz/vyhledani_certifikatu.html";
/// Encoding label of the portal pages (not UTF-8)
pub const PORTAL_ENCODING_LABEL: &str = "windows-1250";
/// Text that precedes the certificate download link in the result page
pub const CERT_LINK_LABEL: &str = "Stáhnout certifikát (DER): <a ";
/// Form field carrying the serial number
pub const FORM_FIELD_SERIAL: &str = "serial";
/// Fixed form fields submitted with every search, besides the serial number
pub const FORM_FIELD_WILDCARD: (&str, &str) = ("wildcard", "on");
pub const FORM_FIELD_QUALIFIED: (&str, &str) = ("qualified", "on");
pub const FORM_FIELD_SUBMIT: (&str, &str) = ("submit", "Vyhledat");
pub const FORM_FIELD_EMAIL: (&str, &str) = ("email", "");
/// User agent sent to the portal
pub const DEFAULT_USER_AGENT: &str = concat!("rocascan/", env!("CARGO_PKG_VERSION"));

/// Default delay after a real download (ms)
pub const DEFAULT_WAIT_MS: u64 = 1000;
/// Default cache folder
pub const DEFAULT_CACHE_DIR: &str = "cache";
/// Default folder for vulnerable certificates
pub const DEFAULT_FOUND_DIR: &str = "found";
/// Extension of cached and found entries
pub const CERT_FILE_EXTENSION: &str = "crt";
/// Extensions recognized as certificate files (compared case-insensitively)
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["crt", "cer", "der", "pem"];
/// Index file written into the indexed folder
pub const INDEX_FILE_NAME: &str = "index.csv";

/// User directory holding logs
pub const USER_DIR_NAME: &str = ".rocascan";
/// Default log file name
pub const DEFAULT_LOG_FILE_NAME: &str = "rocascan.log";
