#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Provenance {
    Wikivoyage(String),
}

impl Provenance {
    pub(crate) fn url(&self) -> String {
        match self {
            Provenance::Wikivoyage(title) => {
                format!("https://en.wikivoyage.org/wiki/{}", title.replace(' ', "_"))
            }
        }
    }

    pub(crate) fn title(&self) -> String {
        match self {
            Provenance::Wikivoyage(title) => title.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wikivoyage_url() {
        let provenance = Provenance::Wikivoyage("New York City".to_string());
        assert_eq!(
            provenance.url(),
            "https://en.wikivoyage.org/wiki/New_York_City"
        );
        assert_eq!(provenance.title(), "New York City");
    }
}
