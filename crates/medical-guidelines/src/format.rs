use crate::model::GuidelineDocument;

const RULE_WIDTH: usize = 80;

/// Render one document as a fixed text block.
pub fn format_document(doc: &GuidelineDocument) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "GUIDELINE: {title}\nSOURCE: {source} ({domain})\nURL: {url}\n{rule}\n\n{body}\n\n{rule}\nEND OF GUIDELINE",
        title = doc.title,
        source = doc.source_name,
        domain = doc.domain,
        url = doc.url,
        body = doc.body,
    )
}

/// Render documents in order, separated by a blank line.
pub fn format_documents(docs: &[GuidelineDocument]) -> String {
    docs.iter()
        .map(format_document)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, body: &str) -> GuidelineDocument {
        GuidelineDocument {
            title: title.to_string(),
            domain: "nice.org.uk".to_string(),
            source_name: "NICE Guidelines".to_string(),
            url: "https://www.nice.org.uk/guidance/ng136".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn single_document_layout() {
        let rule = "=".repeat(80);
        let expected = format!(
            "GUIDELINE: Hypertension in adults\n\
             SOURCE: NICE Guidelines (nice.org.uk)\n\
             URL: https://www.nice.org.uk/guidance/ng136\n\
             {rule}\n\
             \n\
             Offer lifestyle advice.\n\
             \n\
             {rule}\n\
             END OF GUIDELINE"
        );
        assert_eq!(
            format_document(&doc("Hypertension in adults", "Offer lifestyle advice.")),
            expected
        );
    }

    #[test]
    fn documents_are_joined_with_blank_line() {
        let out = format_documents(&[doc("First", "a"), doc("Second", "b")]);
        assert!(out.contains("END OF GUIDELINE\n\nGUIDELINE: Second"));
        assert!(out.starts_with("GUIDELINE: First"));
        assert_eq!(out.matches("END OF GUIDELINE").count(), 2);
    }

    #[test]
    fn no_documents_render_empty() {
        assert_eq!(format_documents(&[]), "");
    }
}
