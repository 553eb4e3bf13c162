// CV pipeline: upload → sniff → text extraction → section split → seq2seq structuring.
// Improvement rewrites an already-structured CV through the same model seam.

pub mod extract;
pub mod handlers;
pub mod model;
pub mod processor;
pub mod sections;
