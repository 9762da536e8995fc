//! Locale handling for message lookup.
//!
//! Only the language component of a locale takes part in store lookups. The
//! store keys rows by the ISO 639-2/T three-letter code (`pol`, `eng`), so this
//! module owns the mapping from the two-letter ISO 639-1 subtags that appear in
//! locale tags.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// ISO 639-1 → ISO 639-2/T, including the legacy `iw`/`in`/`ji` aliases.
static ISO3_LANGUAGES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("aa", "aar"),
        ("ab", "abk"),
        ("ae", "ave"),
        ("af", "afr"),
        ("ak", "aka"),
        ("am", "amh"),
        ("an", "arg"),
        ("ar", "ara"),
        ("as", "asm"),
        ("av", "ava"),
        ("ay", "aym"),
        ("az", "aze"),
        ("ba", "bak"),
        ("be", "bel"),
        ("bg", "bul"),
        ("bh", "bih"),
        ("bi", "bis"),
        ("bm", "bam"),
        ("bn", "ben"),
        ("bo", "bod"),
        ("br", "bre"),
        ("bs", "bos"),
        ("ca", "cat"),
        ("ce", "che"),
        ("ch", "cha"),
        ("co", "cos"),
        ("cr", "cre"),
        ("cs", "ces"),
        ("cu", "chu"),
        ("cv", "chv"),
        ("cy", "cym"),
        ("da", "dan"),
        ("de", "deu"),
        ("dv", "div"),
        ("dz", "dzo"),
        ("ee", "ewe"),
        ("el", "ell"),
        ("en", "eng"),
        ("eo", "epo"),
        ("es", "spa"),
        ("et", "est"),
        ("eu", "eus"),
        ("fa", "fas"),
        ("ff", "ful"),
        ("fi", "fin"),
        ("fj", "fij"),
        ("fo", "fao"),
        ("fr", "fra"),
        ("fy", "fry"),
        ("ga", "gle"),
        ("gd", "gla"),
        ("gl", "glg"),
        ("gn", "grn"),
        ("gu", "guj"),
        ("gv", "glv"),
        ("ha", "hau"),
        ("he", "heb"),
        ("hi", "hin"),
        ("ho", "hmo"),
        ("hr", "hrv"),
        ("ht", "hat"),
        ("hu", "hun"),
        ("hy", "hye"),
        ("hz", "her"),
        ("ia", "ina"),
        ("id", "ind"),
        ("ie", "ile"),
        ("ig", "ibo"),
        ("ii", "iii"),
        ("ik", "ipk"),
        ("in", "ind"),
        ("io", "ido"),
        ("is", "isl"),
        ("it", "ita"),
        ("iu", "iku"),
        ("iw", "heb"),
        ("ja", "jpn"),
        ("ji", "yid"),
        ("jv", "jav"),
        ("ka", "kat"),
        ("kg", "kon"),
        ("ki", "kik"),
        ("kj", "kua"),
        ("kk", "kaz"),
        ("kl", "kal"),
        ("km", "khm"),
        ("kn", "kan"),
        ("ko", "kor"),
        ("kr", "kau"),
        ("ks", "kas"),
        ("ku", "kur"),
        ("kv", "kom"),
        ("kw", "cor"),
        ("ky", "kir"),
        ("la", "lat"),
        ("lb", "ltz"),
        ("lg", "lug"),
        ("li", "lim"),
        ("ln", "lin"),
        ("lo", "lao"),
        ("lt", "lit"),
        ("lu", "lub"),
        ("lv", "lav"),
        ("mg", "mlg"),
        ("mh", "mah"),
        ("mi", "mri"),
        ("mk", "mkd"),
        ("ml", "mal"),
        ("mn", "mon"),
        ("mr", "mar"),
        ("ms", "msa"),
        ("mt", "mlt"),
        ("my", "mya"),
        ("na", "nau"),
        ("nb", "nob"),
        ("nd", "nde"),
        ("ne", "nep"),
        ("ng", "ndo"),
        ("nl", "nld"),
        ("nn", "nno"),
        ("no", "nor"),
        ("nr", "nbl"),
        ("nv", "nav"),
        ("ny", "nya"),
        ("oc", "oci"),
        ("oj", "oji"),
        ("om", "orm"),
        ("or", "ori"),
        ("os", "oss"),
        ("pa", "pan"),
        ("pi", "pli"),
        ("pl", "pol"),
        ("ps", "pus"),
        ("pt", "por"),
        ("qu", "que"),
        ("rm", "roh"),
        ("rn", "run"),
        ("ro", "ron"),
        ("ru", "rus"),
        ("rw", "kin"),
        ("sa", "san"),
        ("sc", "srd"),
        ("sd", "snd"),
        ("se", "sme"),
        ("sg", "sag"),
        ("si", "sin"),
        ("sk", "slk"),
        ("sl", "slv"),
        ("sm", "smo"),
        ("sn", "sna"),
        ("so", "som"),
        ("sq", "sqi"),
        ("sr", "srp"),
        ("ss", "ssw"),
        ("st", "sot"),
        ("su", "sun"),
        ("sv", "swe"),
        ("sw", "swa"),
        ("ta", "tam"),
        ("te", "tel"),
        ("tg", "tgk"),
        ("th", "tha"),
        ("ti", "tir"),
        ("tk", "tuk"),
        ("tl", "tgl"),
        ("tn", "tsn"),
        ("to", "ton"),
        ("tr", "tur"),
        ("ts", "tso"),
        ("tt", "tat"),
        ("tw", "twi"),
        ("ty", "tah"),
        ("ug", "uig"),
        ("uk", "ukr"),
        ("ur", "urd"),
        ("uz", "uzb"),
        ("ve", "ven"),
        ("vi", "vie"),
        ("vo", "vol"),
        ("wa", "wln"),
        ("wo", "wol"),
        ("xh", "xho"),
        ("yi", "yid"),
        ("yo", "yor"),
        ("za", "zha"),
        ("zh", "zho"),
        ("zu", "zul"),
    ]
    .into_iter()
    .collect()
});

/// Errors raised while building a [`Locale`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("Locale tag is empty")]
    Empty,

    #[error("Invalid locale tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    /// Two-letter language with no ISO 639-2 equivalent, or a subtag of unsupported length.
    #[error("Language '{0}' has no three-letter ISO 639 code")]
    UnsupportedLanguage(String),
}

/// Target locale of a resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    /// Parsed identifier; the language subtag is always present.
    id: LanguageIdentifier,
}

impl Locale {
    /// Creates a locale from a bare language subtag (`"pl"`, `"eng"`).
    pub fn new(language: &str) -> Result<Self, LocaleError> {
        Self::parse(language)
    }

    /// Creates a locale from a language and region (`"en"`, `"US"`).
    pub fn with_region(language: &str, region: &str) -> Result<Self, LocaleError> {
        Self::parse(&format!("{language}-{region}"))
    }

    /// Parses a locale tag. Both `-` and `_` are accepted as separators.
    ///
    /// # Examples
    /// ```
    /// use db_message_source::Locale;
    ///
    /// let locale = Locale::parse("pl_PL").unwrap();
    /// assert_eq!(locale.language(), "pl");
    /// assert_eq!(locale.iso3_language(), "pol");
    /// ```
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(LocaleError::Empty);
        }

        let id = LanguageIdentifier::from_str(trimmed).map_err(|e| LocaleError::InvalidTag {
            tag: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        let language = id.language.as_str();
        if id.language.is_empty() {
            return Err(LocaleError::InvalidTag {
                tag: trimmed.to_string(),
                reason: "missing language subtag".to_string(),
            });
        }

        match language.len() {
            2 if ISO3_LANGUAGES.contains_key(language) => {}
            3 => {}
            _ => return Err(LocaleError::UnsupportedLanguage(language.to_string())),
        }

        Ok(Self { id })
    }

    /// Lower-case language subtag as written in the tag.
    #[must_use]
    pub fn language(&self) -> &str {
        self.id.language.as_str()
    }

    /// Upper-case region subtag, if any.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.id.region.as_ref().map(unic_langid::subtags::Region::as_str)
    }

    /// Three-letter ISO 639-2/T language code, the `lang` column of stored messages.
    #[must_use]
    pub fn iso3_language(&self) -> &str {
        let language = self.language();
        ISO3_LANGUAGES.get(language).copied().unwrap_or(language)
    }

    /// Whether the three-letter code is a known ISO 639-2/T language.
    ///
    /// Always true for two-letter tags; a three-letter tag such as `app` parses
    /// but is not a known language.
    #[must_use]
    pub fn has_known_language(&self) -> bool {
        let iso3 = self.iso3_language();
        ISO3_LANGUAGES.values().any(|code| *code == iso3)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region() {
            Some(region) => write!(f, "{}-{region}", self.language()),
            None => f.write_str(self.language()),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}
