use crate::domain::model::{Cluster, Record};

/// 依指紋分群，只保留兩筆以上的群組
///
/// Records are sorted by fingerprint (byte order) with the original line
/// number as tie-break, then scanned once. Output is in ascending fingerprint
/// order. Records without a fingerprint never join a cluster.
pub fn cluster(records: &[Record]) -> Vec<Cluster> {
    let mut sorted: Vec<&Record> = records.iter().filter(|r| r.has_fingerprint()).collect();
    sorted.sort_by(|a, b| {
        a.fingerprint
            .as_bytes()
            .cmp(b.fingerprint.as_bytes())
            .then(a.sequence_index.cmp(&b.sequence_index))
    });

    let mut clusters = Vec::new();
    let mut group: Vec<Record> = Vec::new();

    for record in sorted {
        if group
            .first()
            .is_some_and(|head| head.fingerprint != record.fingerprint)
        {
            close_group(&mut group, &mut clusters);
        }
        group.push(record.clone());
    }
    close_group(&mut group, &mut clusters);

    tracing::debug!(
        "Clustered {} records into {} groups",
        records.len(),
        clusters.len()
    );
    clusters
}

fn close_group(group: &mut Vec<Record>, clusters: &mut Vec<Cluster>) {
    let members = std::mem::take(group);
    if members.len() >= 2 {
        clusters.push(Cluster {
            fingerprint: members[0].fingerprint.clone(),
            members,
        });
    }
}
