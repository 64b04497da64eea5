define_keywords!(
    ACTION,
    AND,
    AS,
    ASC,
    BETWEEN,
    BOOL,
    BY,
    CASCADE,
    CREATE,
    DATABASE,
    DATABASES,
    DATE,
    DATETIME,
    DECIMAL,
    DELETE,
    DESC,
    DESCRIBE,
    DISTINCT,
    DOUBLE,
    DROP,
    FALSE,
    FLOAT,
    FROM,
    FULL,
    GROUP,
    HAVING,
    IN,
    INNER,
    INSERT,
    INT,
    INTO,
    IS,
    JOIN,
    KEY,
    LEFT,
    LIKE,
    LIMIT,
    NO,
    NOT,
    NULL,
    OFFSET,
    ON,
    OR,
    ORDER,
    OUTER,
    PRIMARY,
    REAL,
    REFERENCES,
    RESTRICT,
    RIGHT,
    SELECT,
    SET,
    SHOW,
    STRING,
    TABLE,
    TABLES,
    TIME,
    TIMESTAMP,
    TRUE,
    UNIQUE,
    UPDATE,
    USE,
    VALUES,
    WHERE
);

impl Keyword {
    /// Looks up a word in the reserved vocabulary, case-insensitively.
    pub fn lookup(word: &str) -> Option<Keyword> {
        let uppercase = word.to_uppercase();
        ALL_KEYWORD_STRINGS
            .binary_search(&uppercase.as_str())
            .ok()
            .map(|index| ALL_KEYWORDS[index])
    }

    /// Returns the canonical (uppercase) spelling of the keyword.
    pub fn as_str(&self) -> &'static str {
        ALL_KEYWORD_STRINGS[ALL_KEYWORDS
            .iter()
            .position(|keyword| keyword == self)
            .expect("keyword arrays are generated together")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_strings_are_sorted() {
        let mut sorted = ALL_KEYWORD_STRINGS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, ALL_KEYWORD_STRINGS);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup("select"), Some(Keyword::SELECT));
        assert_eq!(Keyword::lookup("Select"), Some(Keyword::SELECT));
        assert_eq!(Keyword::lookup("TIMESTAMP"), Some(Keyword::TIMESTAMP));
        assert_eq!(Keyword::lookup("customer"), None);
    }

    #[test]
    fn canonical_spelling() {
        assert_eq!(Keyword::PRIMARY.as_str(), "PRIMARY");
        assert_eq!(Keyword::DATETIME.to_string(), "DATETIME");
    }
}
