/// Events emitted by the tokenizer for visitor consumption.
/// Each visitor implements the methods it cares about; default impls are no-ops.
#[allow(unused_variables)]
pub trait HtmlVisitor {
    /// Called when an opening tag is encountered.
    /// `tag_name`: lowercased, e.g. "div", "span"
    /// `is_self_closing`: true for `/>` and for void elements (`br`, `img`, ...)
    /// `raw_tag`: the full tag string from < to > (including attributes)
    fn on_tag_open(&mut self, tag_name: &str, is_self_closing: bool, raw_tag: &str) {}

    /// Called when a closing tag is encountered.
    fn on_tag_close(&mut self, tag_name: &str) {}

    /// Called for character data between tags, with entities decoded.
    fn on_text(&mut self, text: &str) {}

    /// Called when the scan of a document is complete.
    fn on_document_end(&mut self) {}
}
