use regex::Regex;

const REFN_REGEX: &str = "(R|r)efn";
const LANGUAGE_REGEX: &str = "^(L|l)ang";
const LINKTEXT_REGEX: &str = "(L|l)inktext";
const LISTING_REGEX: &str = "^(?i:see|do|buy|eat|drink|sleep|listing|go|marker)$";
const REDIRECT_REGEX: &str = r"^\s*(?i:#redirect)";
const THREE_OR_MORE_NEWLINES: &str = r"\n[ \t]*(\n[ \t]*)+\n";
const TRAILING_WHITESPACE: &str = r"[ \t]+\n";
const TWO_OR_MORE_WHITESPACES: &str = "([ ]{2,})";
const SPACE_COMMA: &str = "([ ]+,)";
const SPACE_PERIOD: &str = r"([ ]+\.)";
const EMPTY_PARENTHESES: &str = r"\(\s*[,;]?\s*\)";

#[derive(Clone)]
pub(crate) struct Regexes {
    pub(crate) refn: Regex,
    pub(crate) language: Regex,
    pub(crate) linktext: Regex,
    pub(crate) listing: Regex,
    pub(crate) redirect: Regex,
    pub(crate) threelines: Regex,
    pub(crate) trailing_whitespace: Regex,
    pub(crate) twospace: Regex,
    pub(crate) space_comma: Regex,
    pub(crate) space_period: Regex,
    pub(crate) empty_parentheses: Regex,
}

impl Regexes {
    pub(crate) fn new() -> Result<Regexes, regex::Error> {
        Ok(Regexes {
            refn: Regex::new(REFN_REGEX)?,
            language: Regex::new(LANGUAGE_REGEX)?,
            linktext: Regex::new(LINKTEXT_REGEX)?,
            listing: Regex::new(LISTING_REGEX)?,
            redirect: Regex::new(REDIRECT_REGEX)?,
            threelines: Regex::new(THREE_OR_MORE_NEWLINES)?,
            trailing_whitespace: Regex::new(TRAILING_WHITESPACE)?,
            twospace: Regex::new(TWO_OR_MORE_WHITESPACES)?,
            space_comma: Regex::new(SPACE_COMMA)?,
            space_period: Regex::new(SPACE_PERIOD)?,
            empty_parentheses: Regex::new(EMPTY_PARENTHESES)?,
        })
    }

    /// Collapses the whitespace left behind by dropped markup.
    pub(crate) fn tidy(&self, text: &str) -> String {
        let text = self.empty_parentheses.replace_all(text, "");
        let text = self.twospace.replace_all(&text, " ");
        let text = self.space_comma.replace_all(&text, ",");
        let text = self.space_period.replace_all(&text, ".");
        let text = self.trailing_whitespace.replace_all(&text, "\n");
        let text = self.threelines.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}
