use uuid::Uuid;

pub type Id = String;

/// Builds `prefix` followed by `length` random lowercase alphanumeric characters.
pub fn generate_name(prefix: &str, length: usize) -> String {
    let mut name = String::with_capacity(prefix.len() + length);
    name.push_str(prefix);

    let mut remaining = length;
    while remaining > 0 {
        let chunk = Uuid::new_v4().simple().to_string();
        let take = remaining.min(chunk.len());
        name.push_str(&chunk[..take]);
        remaining -= take;
    }

    name
}
