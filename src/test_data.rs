pub(crate) const TWO_PAGE_DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/" version="0.10" xml:lang="en">
  <siteinfo>
    <sitename>Wikivoyage</sitename>
  </siteinfo>
  <page>
    <title>Paris</title>
    <ns>0</ns>
    <id>1</id>
    <revision>
      <id>100</id>
      <text bytes="120" xml:space="preserve">'''Paris''' is the capital of [[France]].

== See ==
* The [[Eiffel Tower]]</text>
    </revision>
  </page>
  <page>
    <title>Template:Infobox</title>
    <ns>10</ns>
    <id>2</id>
    <revision>
      <id>101</id>
      <text bytes="9" xml:space="preserve">{{{1}}}</text>
    </revision>
  </page>
</mediawiki>
"#;

/// `text` goes into the document verbatim, so callers escape any markup themselves.
pub(crate) fn page_xml(title: &str, text: &str) -> String {
    format!(
        "<page><title>{title}</title><ns>0</ns><revision><text xml:space=\"preserve\">{text}</text></revision></page>"
    )
}

pub(crate) fn dump_xml(pages: &[String]) -> String {
    format!(
        "<mediawiki xmlns=\"http://www.mediawiki.org/xml/export-0.10/\" version=\"0.10\">\n{}\n</mediawiki>\n",
        pages.join("\n")
    )
}
