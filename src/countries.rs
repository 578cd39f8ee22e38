/// Compiled-in collection tables: which countries we collect, where their
/// trends pages live, and which languages we explain keywords in.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
}

// Collection order matters: it is the order countries are visited each cycle.
pub const COUNTRIES: &[Country] = &[
    Country { code: "US", name: "미국" },
    Country { code: "CA", name: "캐나다" },
    Country { code: "AU", name: "호주" },
    Country { code: "GB", name: "영국" },
    Country { code: "DE", name: "독일" },
    Country { code: "FR", name: "프랑스" },
    Country { code: "NO", name: "노르웨이" },
    Country { code: "SE", name: "스웨덴" },
    Country { code: "JP", name: "일본" },
    Country { code: "KR", name: "한국" },
    Country { code: "SG", name: "싱가포르" },
];

const TRENDS_URLS: &[(&str, &str)] = &[
    ("US", "https://trends.google.com/trending?geo=US"),
    ("CA", "https://trends.google.ca/trending?geo=CA"),
    ("AU", "https://trends.google.com.au/trending?geo=AU"),
    ("GB", "https://trends.google.co.uk/trending?geo=GB"),
    ("DE", "https://trends.google.de/trending?geo=DE"),
    ("FR", "https://trends.google.fr/trending?geo=FR"),
    ("NO", "https://trends.google.no/trending?geo=NO"),
    ("SE", "https://trends.google.se/trending?geo=SE"),
    ("JP", "https://trends.google.co.jp/trending?geo=JP"),
    ("KR", "https://trends.google.co.kr/trending?geo=KR"),
    ("SG", "https://trends.google.com.sg/trending?geo=SG"),
];

/// Language a country's news should be searched in. Defaults to English for
/// anything not in the table.
const NEWS_LANGUAGES: &[(&str, &str)] = &[
    ("US", "en"),
    ("CA", "en"),
    ("AU", "en"),
    ("GB", "en"),
    ("DE", "de"),
    ("FR", "fr"),
    ("NO", "no"),
    ("SE", "sv"),
    ("JP", "ja"),
    ("KR", "ko"),
    ("SG", "en"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    /// Section header the combined-mode prompt asks the model to emit.
    pub marker: &'static str,
}

// The fixed order also defines marker order in the combined prompt.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", marker: "ENGLISH:" },
    Language { code: "ko", name: "Korean", marker: "KOREAN:" },
    Language { code: "ja", name: "Japanese", marker: "JAPANESE:" },
    Language { code: "de", name: "German", marker: "GERMAN:" },
    Language { code: "fr", name: "French", marker: "FRENCH:" },
    Language { code: "no", name: "Norwegian", marker: "NORWEGIAN:" },
    Language { code: "sv", name: "Swedish", marker: "SWEDISH:" },
];

pub fn trends_url(country_code: &str) -> Option<&'static str> {
    TRENDS_URLS
        .iter()
        .find(|(code, _)| *code == country_code)
        .map(|(_, url)| *url)
}

pub fn news_language(country_code: &str) -> &'static str {
    NEWS_LANGUAGES
        .iter()
        .find(|(code, _)| *code == country_code)
        .map(|(_, lang)| *lang)
        .unwrap_or("en")
}
