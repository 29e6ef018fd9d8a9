use rs_merkle::{Hasher, MerkleProof, MerkleTree, algorithms::Sha256};

use vehicle_ledger_types::MaintenanceRecord;

/// Merkle tree over one vehicle's history, for publishing an audit root.
pub struct HistoryTree {
    tree: MerkleTree<Sha256>,
    len: usize,
}

impl HistoryTree {
    pub fn from_records(records: &[MaintenanceRecord]) -> Self {
        let leaves: Vec<[u8; 32]> = records.iter().map(record_leaf).collect();
        Self {
            tree: MerkleTree::<Sha256>::from_leaves(&leaves),
            len: leaves.len(),
        }
    }

    pub fn root(&self) -> Option<[u8; 32]> {
        self.tree.root()
    }

    pub fn root_hex(&self) -> Option<String> {
        self.tree.root_hex()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Serialized inclusion proof for the record at `index`.
    pub fn proof(&self, index: usize) -> Option<Vec<u8>> {
        if index >= self.len {
            return None;
        }
        Some(self.tree.proof(&[index]).to_bytes())
    }
}

pub fn record_leaf(record: &MaintenanceRecord) -> [u8; 32] {
    let data = format!("{}:{}", record.id, record.hash);
    Sha256::hash(data.as_bytes())
}

/// Check that `record` sits at `index` of a history of `total` records with
/// the given root.
pub fn verify_inclusion(
    root: [u8; 32],
    record: &MaintenanceRecord,
    index: usize,
    total: usize,
    proof: &[u8],
) -> bool {
    match MerkleProof::<Sha256>::from_bytes(proof) {
        Ok(proof) => proof.verify(root, &[index], &[record_leaf(record)], total),
        Err(_) => false,
    }
}
