use crate::{catalog::DefinitionCatalog, profiles::ConnectionProfile};

/// Profiles whose id, type display name, host or database contain `query`,
/// ignoring case. An empty query matches everything.
pub fn search<'a>(
    profiles: &'a [ConnectionProfile],
    catalog: &DefinitionCatalog,
    query: &str,
) -> Vec<&'a ConnectionProfile> {
    let needle = query.to_lowercase();
    profiles
        .iter()
        .filter(|profile| {
            needle.is_empty()
                || [
                    profile.id.as_str(),
                    catalog.display_name_for(&profile.kind),
                    profile.host.as_str(),
                    profile.database.as_str(),
                ]
                .iter()
                .any(|column| column.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<ConnectionProfile> {
        vec![
            ConnectionProfile::new("postgresql", "db.example.com", "5432", "u", "p", "sales")
                .with_id("connection_1"),
            ConnectionProfile::new("microsoftsqlserver", "mssql.corp", "1433", "u", "p", "hr")
                .with_id("reporting"),
        ]
    }

    fn ids(found: Vec<&ConnectionProfile>) -> Vec<&str> {
        found.into_iter().map(|profile| profile.id.as_str()).collect()
    }

    #[test]
    fn matches_each_listed_column() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        let profiles = profiles();
        assert_eq!(ids(search(&profiles, &catalog, "REPORT")), vec!["reporting"]);
        assert_eq!(ids(search(&profiles, &catalog, "sql server")), vec!["reporting"]);
        assert_eq!(ids(search(&profiles, &catalog, "example")), vec!["connection_1"]);
        assert_eq!(ids(search(&profiles, &catalog, "sales")), vec!["connection_1"]);
    }

    #[test]
    fn ignores_username_and_password() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        let mut hidden = profiles();
        hidden[0].password = "needle".into();
        assert!(search(&hidden, &catalog, "needle").is_empty());
    }

    #[test]
    fn empty_query_returns_everything() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        assert_eq!(search(&profiles(), &catalog, "").len(), 2);
    }

    #[test]
    fn spaces_in_the_query_are_matched_literally() {
        let catalog = DefinitionCatalog::bundled().unwrap();
        let profiles = profiles();
        assert_eq!(ids(search(&profiles, &catalog, " ")), vec!["reporting"]);
        assert!(search(&profiles, &catalog, " sales").is_empty());
    }
}
