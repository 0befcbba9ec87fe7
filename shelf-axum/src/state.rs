use shelf_blob::BlobAdapter;

#[derive(Clone)]
pub struct ShelfState {
    pub blobs: BlobAdapter,
}

impl ShelfState {
    pub fn new(blobs: BlobAdapter) -> Self {
        Self { blobs }
    }
}
