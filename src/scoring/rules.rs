use crate::models::VendorType;

/// One vendor-type indicator rule. The highest-weight matching rule decides
/// the type; declaration order breaks weight ties (first declared wins).
pub(crate) struct TypeRule {
    pub vendor_type: VendorType,
    pub weight: u32,
    pub keywords: &'static [&'static str],
}

pub(crate) const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        vendor_type: VendorType::Deepfake,
        weight: 30,
        keywords: &[
            "deepfake",
            "face-swap",
            "voice-clone",
            "impersonate",
            "clone",
            "replica",
            "fake-video",
            "ai-face",
        ],
    },
    TypeRule {
        vendor_type: VendorType::Impersonation,
        weight: 20,
        keywords: &[
            "impersonate",
            "pretend",
            "roleplay",
            "character",
            "profile-pack",
            "identity-kit",
        ],
    },
    TypeRule {
        vendor_type: VendorType::SyntheticIdentity,
        weight: 10,
        keywords: &[
            "identity",
            "id",
            "persona",
            "profile",
            "fake",
            "synthetic",
            "document",
            "passport",
            "license",
            "ssn",
            "credit",
        ],
    },
];

/// Domain-name keywords that on their own mark a likely vendor site
pub(crate) const STRONG_VENDOR_KEYWORDS: &[&str] = &[
    "fakeid",
    "fake-id",
    "fakeidvendor",
    "fakeidshop",
    "fakeidstore",
    "deepfake",
    "deep-fake",
    "deepfakeservice",
    "face-swap",
    "voice-clone",
    "syntheticid",
    "synthetic-id",
    "personakit",
    "persona-kit",
    "identitypack",
    "fakedocs",
    "fake-docs",
    "fakedocuments",
    "fake-documents",
    "kycbypass",
    "kyc-bypass",
    "fakekyc",
    "fake-kyc",
];

pub(crate) const MEDIUM_VENDOR_KEYWORDS: &[&str] = &[
    "fake",
    "synthetic",
    "clone",
    "impersonate",
    "persona",
    "identity",
    "document",
    "passport",
    "license",
    "ssn",
    "credit",
];

pub(crate) const CRYPTO_PAYMENT_INDICATORS: &[&str] = &[
    "crypto", "bitcoin", "btc", "eth", "ethereum", "monero", "xmr",
];

pub(crate) const MAINSTREAM_PAYMENT_PROCESSORS: &[&str] = &["stripe", "paypal", "square"];

pub(crate) const OFFSHORE_HOSTING_INDICATORS: &[&str] = &["offshore", "bulletproof", "anonymous"];

pub(crate) const MAINSTREAM_HOSTING_PROVIDERS: &[&str] =
    &["cloudflare", "amazon", "google", "microsoft", "aws"];

pub(crate) const PRIVACY_REGISTRAR_INDICATORS: &[&str] =
    &["privacy", "anonymous", "offshore", "bulletproof"];

pub(crate) const MAINSTREAM_REGISTRARS: &[&str] = &["godaddy", "namecheap", "google", "cloudflare"];

/// Sites that show up in scraped discussions without being vendors
/// themselves. Matching one is a strong negative signal.
pub(crate) const MENTION_ONLY_SITES: &[&str] = &[
    "reddit.com",
    "youtube.com",
    "twitter.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "github.com",
    "stackoverflow.com",
    "wikipedia.org",
    "news",
    "blog",
    "article",
    "report",
    "study",
    "research",
    "gov",
    "edu",
    "bloomberg",
    "reuters",
    "cnn",
    "bbc",
    "nytimes",
    "washingtonpost",
    "coinbase",
    "binance",
    "ethereum",
    "bitcoin.org",
];
