//! Fixed extraction vocabularies.
//!
//! Every table here is scanned in order with first-match-wins semantics, so
//! ordering is part of the contract: canonical spellings come before their
//! variants ("Hermès" before "Hermes") and multi-word terms before the
//! generic words they contain ("classic flap" before "flap").

/// Lowercased brand needle → canonical display name. Scanned over
/// `title + text` for listings and over the raw utterance for queries.
pub const BRANDS: &[(&str, &str)] = &[
    ("hermès", "Hermès"),
    ("hermes", "Hermès"),
    ("chanel", "Chanel"),
    ("louis vuitton", "Louis Vuitton"),
    ("lv", "Louis Vuitton"),
    ("gucci", "Gucci"),
    ("prada", "Prada"),
    ("christian dior", "Christian Dior"),
    ("dior", "Dior"),
    ("céline", "Céline"),
    ("celine", "Céline"),
    ("bottega veneta", "Bottega Veneta"),
    ("bottega", "Bottega Veneta"),
    ("balenciaga", "Balenciaga"),
    ("saint laurent", "Saint Laurent"),
    ("ysl", "Saint Laurent"),
    ("fendi", "Fendi"),
    ("loewe", "Loewe"),
    ("chloé", "Chloé"),
    ("chloe", "Chloé"),
    ("givenchy", "Givenchy"),
    ("valentino", "Valentino"),
    ("burberry", "Burberry"),
    ("goyard", "Goyard"),
];

/// Bag categories and house model names, lowercased. First match wins and is
/// title-cased for display.
pub const BAG_TYPES: &[&str] = &[
    "tote",
    "shoulder",
    "crossbody",
    "clutch",
    "top-handle",
    "satchel",
    "hobo",
    "backpack",
    "bucket",
    "classic flap",
    "flap",
    "belt bag",
    "mini bag",
    "birkin",
    "kelly",
    "boy bag",
    "speedy",
    "neverfull",
    "lady dior",
];

/// Attribute colors, most common first.
pub const COLORS: &[&str] = &[
    "black", "brown", "tan", "beige", "white", "cream", "red", "blue", "green", "pink", "gold",
    "silver", "navy", "burgundy", "orange", "yellow", "purple", "grey", "gray", "nude", "camel",
];

/// Size tokens: named sizes, centimeter designations, and house codes
/// (PM/MM/GM).
pub const SIZES: &[&str] = &[
    "mini", "small", "medium", "large", "jumbo", "25", "30", "35", "40", "pm", "mm", "gm", "nano",
    "micro",
];

/// Leathers and fabrics, including house-specific leather names.
pub const MATERIALS: &[&str] = &[
    "leather",
    "canvas",
    "suede",
    "exotic",
    "tweed",
    "denim",
    "nylon",
    "lambskin",
    "calfskin",
    "caviar",
    "togo",
    "epsom",
    "clemence",
    "crocodile",
    "python",
];

/// Hostname fragments of resale marketplaces; a listing from one of these is
/// assumed pre-owned unless the text says otherwise.
pub const RESALE_HOSTS: &[&str] = &[
    "therealreal",
    "vestiaire",
    "rebag",
    "fashionphile",
    "ebay",
];

/// Conversational bag-type phrasings → display category. Aliases such as
/// "evening bag" or "work bag" map onto the category a shopper means.
pub const QUERY_BAG_TYPES: &[(&str, &str)] = &[
    ("tote", "Tote"),
    ("shoulder bag", "Shoulder"),
    ("shoulder", "Shoulder"),
    ("crossbody", "Crossbody"),
    ("cross body", "Crossbody"),
    ("clutch", "Clutch"),
    ("top handle", "Top-handle"),
    ("top-handle", "Top-handle"),
    ("satchel", "Satchel"),
    ("hobo", "Hobo"),
    ("backpack", "Backpack"),
    ("bucket bag", "Bucket"),
    ("bucket", "Bucket"),
    ("flap bag", "Flap"),
    ("flap", "Flap"),
    ("belt bag", "Belt Bag"),
    ("mini bag", "Mini Bag"),
    ("mini", "Mini Bag"),
    ("evening bag", "Clutch"),
    ("evening", "Clutch"),
    ("work bag", "Tote"),
    ("office bag", "Tote"),
    ("travel bag", "Tote"),
    ("weekend bag", "Tote"),
];

/// Occasion phrasings → inferred bag type, consulted only when no direct
/// bag-type keyword matched.
pub const OCCASIONS: &[(&str, &str)] = &[
    ("cocktail dinner", "Clutch"),
    ("cocktail", "Clutch"),
    ("dinner", "Clutch"),
    ("party", "Clutch"),
    ("evening", "Clutch"),
    ("night out", "Clutch"),
    ("date night", "Clutch"),
    ("wedding", "Clutch"),
    ("gala", "Clutch"),
    ("formal", "Clutch"),
    ("work", "Tote"),
    ("office", "Tote"),
    ("business", "Tote"),
    ("professional", "Tote"),
    ("everyday", "Shoulder"),
    ("daily", "Shoulder"),
    ("casual", "Crossbody"),
    ("weekend", "Crossbody"),
    ("travel", "Tote"),
    ("vacation", "Crossbody"),
    ("brunch", "Crossbody"),
    ("shopping", "Tote"),
];

/// Query-side color list; includes cognac, which listing attributes omit.
pub const QUERY_COLORS: &[&str] = &[
    "black", "white", "red", "blue", "green", "pink", "gold", "silver", "brown", "tan", "beige",
    "cream", "navy", "burgundy", "orange", "yellow", "purple", "grey", "gray", "nude", "camel",
    "cognac",
];
