use serde::Deserialize;
use serde_json::json;

use super::{ApiParams, Chorus, ChorusTransport, parse_answer};
use crate::core::{ChorusError, Company};

/// Structure search endpoint.
pub const STRUCTURE_SEARCH_PATH: &str = "structures/v1/rechercher";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructureSearchAnswer {
    #[serde(default)]
    liste_structures: Vec<StructureEntry>,
}

#[derive(Debug, Deserialize)]
struct StructureEntry {
    #[serde(rename = "idStructureCPP")]
    id_structure_cpp: i64,
}

impl<T: ChorusTransport> Chorus<T> {
    /// Chorus Pro structure identifier (`idStructureCPP`) of a company.
    ///
    /// Looked up once per company: the partner's stored identifier is used
    /// when present, otherwise the portal is searched by SIRET.
    pub fn company_structure_identifier(
        &mut self,
        company: &Company,
        params: &ApiParams,
    ) -> Result<i64, ChorusError> {
        let Self {
            transport,
            identifiers,
            ..
        } = self;
        identifiers.get_or_fetch(company.id, || {
            if let Some(identifier) = company.partner.chorus_identifier {
                return Ok(identifier);
            }
            let siret = company
                .partner
                .siret()
                .ok_or_else(|| ChorusError::MissingCompanySiret {
                    partner: company.partner.display_name().to_string(),
                    company: company.display_name().to_string(),
                })?;
            tracing::info!(company = %company.name, %siret, "fetching Chorus Pro structure identifier");
            search_structure(transport, params, &siret)?.ok_or_else(|| {
                ChorusError::CompanyIdentifierNotFound {
                    company: company.name.clone(),
                    siret: siret.clone(),
                }
            })
        })
    }
}

/// Search a structure by SIRET. `None` unless exactly one structure matches.
fn search_structure<T: ChorusTransport>(
    transport: &mut T,
    params: &ApiParams,
    siret: &str,
) -> Result<Option<i64>, ChorusError> {
    let payload = json!({
        "structure": {
            "identifiantStructure": siret,
            "typeIdentifiantStructure": "SIRET",
        },
        "restreindreStructuresPrivees": false,
    });
    let answer = transport.post(params, STRUCTURE_SEARCH_PATH, &payload)?;
    let answer: StructureSearchAnswer = parse_answer(STRUCTURE_SEARCH_PATH, answer)?;
    match answer.liste_structures.as_slice() {
        [single] => Ok(Some(single.id_structure_cpp)),
        [] => Ok(None),
        several => {
            tracing::warn!(siret, count = several.len(), "several Chorus Pro structures share this SIRET");
            Ok(None)
        }
    }
}
