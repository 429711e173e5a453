use std::fmt;

use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_string, non_blank};
use crate::api::upload::{Attachment, UploadError};

/// Generates a closed set of form choices with their wire spellings.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL.iter().copied().find(|v| v.as_str().eq_ignore_ascii_case(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(OrganizationType {
    Private => "Private",
    Partnership => "Partnership",
    Individual => "Individual",
});

choice_enum!(MembershipType {
    Lifetime => "Lifetime",
    Normal => "Normal",
    Associate => "Associate",
    Sakha => "Sakha",
    Manyartha => "Manyartha",
    Bastugat => "Bastugat",
});

choice_enum!(BusinessNature {
    Udhog => "Udhog",
    Badihya => "Badihya",
    Nikaya => "Nikaya",
});

choice_enum!(
    /// Membership renewal status; drives the dashboard counts.
    RenewStatus {
        Active => "Active",
        Inactive => "Inactive",
    }
);

choice_enum!(LeadershipGender {
    Male => "Male",
    Female => "Female",
    Others => "Others",
});

/// Industry of a member company. Anything outside the fixed list is kept
/// verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndustryType {
    Media,
    It,
    Suppliers,
    Manufacturing,
    Ngo,
    Other(String),
}

impl IndustryType {
    pub const LISTED: &'static [&'static str] = &["Media", "IT", "Suppliers", "Manufacturing", "NGO"];

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Media" => IndustryType::Media,
            "IT" => IndustryType::It,
            "Suppliers" => IndustryType::Suppliers,
            "Manufacturing" => IndustryType::Manufacturing,
            "NGO" => IndustryType::Ngo,
            other => IndustryType::Other(other.to_string()),
        }
    }

    /// Value sent to the backend. A blank custom industry falls back to "Others".
    pub fn wire_value(&self) -> &str {
        match self {
            IndustryType::Media => "Media",
            IndustryType::It => "IT",
            IndustryType::Suppliers => "Suppliers",
            IndustryType::Manufacturing => "Manufacturing",
            IndustryType::Ngo => "NGO",
            IndustryType::Other(custom) => {
                let custom = custom.trim();
                if custom.is_empty() {
                    "Others"
                } else {
                    custom
                }
            }
        }
    }
}

/// A company is registered with either a VAT or a PAN number, not both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxId {
    Vat(String),
    Pan(String),
}

/// State of one document upload slot in the company form.
#[derive(Debug, Clone, Default)]
pub enum DocumentSlot {
    #[default]
    Empty,
    /// Keep the file already stored at this URL.
    Keep(String),
    /// Replace with a newly chosen file.
    Upload(Attachment),
}

#[derive(Debug, Clone, Default)]
pub struct CompanyDocuments {
    pub registration: DocumentSlot,
    pub citizenship_front: DocumentSlot,
    pub citizenship_back: DocumentSlot,
    pub photo: DocumentSlot,
}

impl CompanyDocuments {
    /// Slots keyed by their multipart field names.
    pub fn slots(&self) -> [(&'static str, &DocumentSlot); 4] {
        [
            ("registration", &self.registration),
            ("citizenshipFront", &self.citizenship_front),
            ("citizenshipBack", &self.citizenship_back),
            ("photo", &self.photo),
        ]
    }

    /// Keep every document currently stored for `company`.
    pub fn retaining(company: &Company) -> Self {
        let keep = |url: &Option<String>| match url.as_deref().filter(|u| !u.is_empty()) {
            Some(u) => DocumentSlot::Keep(u.to_string()),
            None => DocumentSlot::Empty,
        };
        Self {
            registration: keep(&company.registration_url),
            citizenship_front: keep(&company.citizenship_front_url),
            citizenship_back: keep(&company.citizenship_back_url),
            photo: keep(&company.photo_url),
        }
    }
}

/// Member company as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(alias = "_id", deserialize_with = "de_id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub registration_no: Option<String>,
    #[serde(alias = "name")]
    pub company_name_eng: Option<String>,
    pub company_name_nep: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "type")]
    pub organization_type: Option<String>,
    pub contact_person: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub phone_no: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub tel_phone: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub number_of_employees: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub capital: Option<String>,
    pub renew_status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub vat: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub pan: Option<String>,
    pub description: Option<String>,
    pub registration_date: Option<String>,
    pub membership_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub membership_no: Option<String>,
    pub membership_type: Option<String>,
    pub industry_type: Option<String>,
    pub business_nature: Option<String>,
    pub leadership_gender: Option<String>,
    pub registration_url: Option<String>,
    pub citizenship_front_url: Option<String>,
    pub citizenship_back_url: Option<String>,
    pub photo_url: Option<String>,
}

impl Company {
    pub fn display_name(&self) -> &str {
        self.company_name_eng
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("(unnamed)")
    }

    pub fn renew_status(&self) -> Option<RenewStatus> {
        self.renew_status.as_deref().and_then(RenewStatus::parse)
    }

    pub fn is_active(&self) -> bool {
        self.renew_status() == Some(RenewStatus::Active)
    }

    pub fn tax_id(&self) -> Option<TaxId> {
        let vat = self.vat.as_deref().filter(|v| !v.trim().is_empty());
        let pan = self.pan.as_deref().filter(|v| !v.trim().is_empty());
        match (vat, pan) {
            (Some(v), _) => Some(TaxId::Vat(v.to_string())),
            (None, Some(p)) => Some(TaxId::Pan(p.to_string())),
            (None, None) => None,
        }
    }

    /// Stored documents as (label, url) pairs, skipping empty slots.
    pub fn documents(&self) -> Vec<(&'static str, &str)> {
        [
            ("Registration", &self.registration_url),
            ("Photo", &self.photo_url),
            ("Citizenship Front", &self.citizenship_front_url),
            ("Citizenship Back", &self.citizenship_back_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.as_deref()
                .filter(|u| !u.trim().is_empty())
                .map(|u| (label, u))
        })
        .collect()
    }
}

/// The company registration/edit form.
#[derive(Debug, Clone)]
pub struct CompanyDraft {
    pub registration_no: String,
    pub company_name_eng: String,
    pub company_name_nep: String,
    pub address: String,
    pub email: String,
    pub organization_type: OrganizationType,
    pub contact_person: String,
    pub phone_no: String,
    pub tel_phone: String,
    pub number_of_employees: String,
    pub capital: String,
    pub renew_status: RenewStatus,
    pub tax_id: TaxId,
    pub description: String,
    pub registration_date: String,
    pub membership_date: String,
    pub membership_no: String,
    pub membership_type: MembershipType,
    pub industry_type: IndustryType,
    pub business_nature: BusinessNature,
    pub leadership_gender: LeadershipGender,
    pub documents: CompanyDocuments,
}

impl Default for CompanyDraft {
    fn default() -> Self {
        Self {
            registration_no: String::new(),
            company_name_eng: String::new(),
            company_name_nep: String::new(),
            address: String::new(),
            email: String::new(),
            organization_type: OrganizationType::Private,
            contact_person: String::new(),
            phone_no: String::new(),
            tel_phone: String::new(),
            number_of_employees: String::new(),
            capital: String::new(),
            renew_status: RenewStatus::Active,
            tax_id: TaxId::Vat(String::new()),
            description: String::new(),
            registration_date: String::new(),
            membership_date: String::new(),
            membership_no: String::new(),
            membership_type: MembershipType::Lifetime,
            industry_type: IndustryType::It,
            business_nature: BusinessNature::Udhog,
            leadership_gender: LeadershipGender::Male,
            documents: CompanyDocuments::default(),
        }
    }
}

impl CompanyDraft {
    /// Prefill the edit form from a stored company, keeping its documents.
    pub fn from_company(company: &Company) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let defaults = Self::default();
        Self {
            registration_no: text(&company.registration_no),
            company_name_eng: text(&company.company_name_eng),
            company_name_nep: text(&company.company_name_nep),
            address: text(&company.address),
            email: text(&company.email),
            organization_type: company
                .organization_type
                .as_deref()
                .and_then(OrganizationType::parse)
                .unwrap_or(defaults.organization_type),
            contact_person: text(&company.contact_person),
            phone_no: text(&company.phone_no),
            tel_phone: text(&company.tel_phone),
            number_of_employees: text(&company.number_of_employees),
            capital: text(&company.capital),
            renew_status: company.renew_status().unwrap_or(defaults.renew_status),
            tax_id: company.tax_id().unwrap_or(defaults.tax_id),
            description: text(&company.description),
            registration_date: crate::utils::date_part(company.registration_date.as_deref().unwrap_or_default()),
            membership_date: crate::utils::date_part(company.membership_date.as_deref().unwrap_or_default()),
            membership_no: text(&company.membership_no),
            membership_type: company
                .membership_type
                .as_deref()
                .and_then(MembershipType::parse)
                .unwrap_or(defaults.membership_type),
            industry_type: company
                .industry_type
                .as_deref()
                .map(IndustryType::parse)
                .unwrap_or(defaults.industry_type),
            business_nature: company
                .business_nature
                .as_deref()
                .and_then(BusinessNature::parse)
                .unwrap_or(defaults.business_nature),
            leadership_gender: company
                .leadership_gender
                .as_deref()
                .and_then(LeadershipGender::parse)
                .unwrap_or(defaults.leadership_gender),
            documents: CompanyDocuments::retaining(company),
        }
    }

    /// Required fields: membership number, address and the chosen tax number.
    pub fn validate(&self) -> Result<(), UploadError> {
        if non_blank(&self.membership_no).is_none() {
            return Err(UploadError::MissingField("membership number"));
        }
        if non_blank(&self.address).is_none() {
            return Err(UploadError::MissingField("address"));
        }
        match &self.tax_id {
            TaxId::Vat(v) if non_blank(v).is_none() => Err(UploadError::MissingField("VAT number")),
            TaxId::Pan(p) if non_blank(p).is_none() => Err(UploadError::MissingField("PAN number")),
            _ => Ok(()),
        }
    }

    /// Text parts of the multipart body, in form order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let (vat, pan) = match &self.tax_id {
            TaxId::Vat(v) => (v.trim().to_string(), String::new()),
            TaxId::Pan(p) => (String::new(), p.trim().to_string()),
        };

        let mut fields = vec![
            ("registrationNo", self.registration_no.trim().to_string()),
            ("companyNameEng", self.company_name_eng.trim().to_string()),
            ("companyNameNep", self.company_name_nep.trim().to_string()),
            ("address", self.address.trim().to_string()),
            ("email", self.email.trim().to_string()),
            ("organizationType", self.organization_type.to_string()),
            ("contactPerson", self.contact_person.trim().to_string()),
            ("phoneNo", self.phone_no.trim().to_string()),
            ("numberOfEmployees", self.number_of_employees.trim().to_string()),
            ("capital", self.capital.trim().to_string()),
            ("renewStatus", self.renew_status.to_string()),
            ("vat", vat),
            ("pan", pan),
            ("description", self.description.clone()),
            ("registrationDate", self.registration_date.trim().to_string()),
            ("membershipDate", self.membership_date.trim().to_string()),
            ("membershipNo", self.membership_no.trim().to_string()),
            ("membershipType", self.membership_type.to_string()),
            ("industryType", self.industry_type.wire_value().to_string()),
            ("businessNature", self.business_nature.to_string()),
            ("telPhone", self.tel_phone.trim().to_string()),
            ("leadershipGender", self.leadership_gender.to_string()),
        ];

        for (name, slot) in self.documents.slots() {
            if let DocumentSlot::Keep(url) = slot {
                fields.push((retain_field(name), url.clone()));
            }
        }
        fields
    }

    /// File parts of the multipart body.
    pub fn uploads(&self) -> Vec<(&'static str, &Attachment)> {
        self.documents
            .slots()
            .into_iter()
            .filter_map(|(name, slot)| match slot {
                DocumentSlot::Upload(file) => Some((name, file)),
                _ => None,
            })
            .collect()
    }
}

/// Field carrying the URL of a document to keep, e.g. `photoUrl`.
fn retain_field(slot: &str) -> &'static str {
    match slot {
        "registration" => "registrationUrl",
        "citizenshipFront" => "citizenshipFrontUrl",
        "citizenshipBack" => "citizenshipBackUrl",
        _ => "photoUrl",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_parse_company_with_mixed_types() {
        let json = r#"{
            "_id": 42,
            "registrationNo": 1234,
            "companyNameEng": "Himal Traders",
            "email": "info@himal.example",
            "organizationType": "Private",
            "numberOfEmployees": 25,
            "capital": "8500000",
            "renewStatus": "Active",
            "vat": "",
            "pan": 601234567,
            "industryType": "Tourism",
            "photoUrl": "https://files.example/photo.jpg",
            "registrationUrl": ""
        }"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.id, "42");
        assert_eq!(company.registration_no.as_deref(), Some("1234"));
        assert_eq!(company.number_of_employees.as_deref(), Some("25"));
        assert!(company.is_active());
        assert_eq!(company.tax_id(), Some(TaxId::Pan("601234567".to_string())));
        assert_eq!(company.documents(), vec![("Photo", "https://files.example/photo.jpg")]);
    }

    #[test]
    fn test_parse_legacy_list_shape() {
        let json = r#"{"id":"c1","name":"Old Style Pvt","type":"Partnership"}"#;
        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.display_name(), "Old Style Pvt");
        assert_eq!(company.organization_type.as_deref(), Some("Partnership"));
        assert!(company.renew_status().is_none());
    }

    #[test]
    fn test_choice_parse_is_case_insensitive() {
        assert_eq!(RenewStatus::parse("inactive"), Some(RenewStatus::Inactive));
        assert_eq!(MembershipType::parse(" Sakha "), Some(MembershipType::Sakha));
        assert_eq!(OrganizationType::parse("Corporation"), None);
    }

    #[test]
    fn test_industry_other_uses_custom_text() {
        assert_eq!(IndustryType::parse("IT"), IndustryType::It);
        assert_eq!(IndustryType::parse("Tourism").wire_value(), "Tourism");
        assert_eq!(IndustryType::Other("  ".to_string()).wire_value(), "Others");
    }

    #[test]
    fn test_form_fields_send_only_chosen_tax_id() {
        let draft = CompanyDraft {
            company_name_eng: " Himal Traders ".to_string(),
            tax_id: TaxId::Pan("601234567".to_string()),
            industry_type: IndustryType::Other("Tourism".to_string()),
            ..CompanyDraft::default()
        };
        let fields = draft.form_fields();
        assert_eq!(field(&fields, "companyNameEng"), Some("Himal Traders"));
        assert_eq!(field(&fields, "vat"), Some(""));
        assert_eq!(field(&fields, "pan"), Some("601234567"));
        assert_eq!(field(&fields, "industryType"), Some("Tourism"));
        assert_eq!(field(&fields, "renewStatus"), Some("Active"));
        assert_eq!(field(&fields, "membershipType"), Some("Lifetime"));
    }

    #[test]
    fn test_draft_requires_membership_no_address_and_tax_number() {
        let mut draft = CompanyDraft {
            company_name_eng: "Himal Traders".to_string(),
            tax_id: TaxId::Pan("601234567".to_string()),
            ..CompanyDraft::default()
        };
        assert!(matches!(draft.validate(), Err(UploadError::MissingField("membership number"))));

        draft.membership_no = "1042".to_string();
        draft.address = "  ".to_string();
        assert!(matches!(draft.validate(), Err(UploadError::MissingField("address"))));

        draft.address = "Bazar".to_string();
        assert!(draft.validate().is_ok());

        draft.tax_id = TaxId::Vat(String::new());
        assert!(matches!(draft.validate(), Err(UploadError::MissingField("VAT number"))));
    }

    #[test]
    fn test_edit_draft_retains_existing_documents() {
        let company = Company {
            id: "7".to_string(),
            registration_url: Some("https://files.example/reg.jpg".to_string()),
            photo_url: Some(String::new()),
            registration_date: Some("2021-04-13T00:00:00.000Z".to_string()),
            industry_type: Some("Tourism".to_string()),
            ..Company::default()
        };
        let mut draft = CompanyDraft::from_company(&company);
        assert_eq!(draft.registration_date, "2021-04-13");
        assert_eq!(draft.industry_type, IndustryType::Other("Tourism".to_string()));

        draft.documents.photo = DocumentSlot::Upload(Attachment {
            file_name: "owner.png".to_string(),
            mime: "image/png",
            bytes: vec![1, 2, 3],
        });

        let fields = draft.form_fields();
        assert_eq!(field(&fields, "registrationUrl"), Some("https://files.example/reg.jpg"));
        assert_eq!(field(&fields, "photoUrl"), None);

        let uploads = draft.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "photo");
        assert_eq!(uploads[0].1.file_name, "owner.png");
    }
}
