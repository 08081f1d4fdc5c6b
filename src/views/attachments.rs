//! Attachment table.

use crate::dom::Element;
use crate::models::{Attachment, LocaleConfig};
use crate::utils::format_size;

use super::common::{time, user_link};

/// Download location of an attachment.
pub fn attachment_href(attachment: &Attachment) -> String {
    format!("/attachments/{}/download", attachment.id)
}

pub fn attachment_table(attachments: &[Attachment], locale: &LocaleConfig) -> Element {
    let rows = attachments.iter().map(|attachment| {
        let mut name = Element::new("td").child(
            Element::new("a")
                .attr("href", attachment_href(attachment))
                .text(&attachment.name),
        );
        if !attachment.approved {
            name.push(Element::new("span").class("uk-label-warning").text("unapproved"));
        }

        Element::new("tr")
            .id(format!("attachment-{}", attachment.id))
            .child(name)
            .child(Element::new("td").text(format_size(attachment.size)))
            .child(
                Element::new("td")
                    .child(user_link(attachment.created_by.as_ref(), locale))
                    .child(" ")
                    .child(time(&attachment.created)),
            )
            .child(Element::new("td").text(attachment.download_count.to_string()))
    });

    Element::new("table")
        .class("uk-table attachment-list")
        .child(
            Element::new("thead").child(Element::new("tr").children(
                ["Name", "Size", "Uploaded", "Downloads"].map(|l| Element::new("th").text(l)),
            )),
        )
        .child(Element::new("tbody").children(rows))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_attachment_row() {
        let attachment = Attachment {
            id: "a1".into(),
            name: "report.pdf".into(),
            size: 2048,
            created: Utc::now(),
            created_by: None,
            approved: false,
            download_count: 7,
        };
        let table = attachment_table(&[attachment], &LocaleConfig::default());
        let row = table.find_by_id("attachment-a1").unwrap();

        assert_eq!(row.find_by_tag("a")[0].get_attr("href"), Some("/attachments/a1/download"));
        assert!(row.text_content().contains("unapproved"));
        assert!(row.text_content().contains('7'));
    }
}
