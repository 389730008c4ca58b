//! Vendors

use super::{Access, FeatureModule, Governed, ModulePolicy};
use crate::auth::Capability;
use crate::db::{Record, keys};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_email, validate_optional_text,
    validate_required_text,
};
use shared::error::AppResult;
use shared::models::{EngagementStatus, Vendor, VendorCreate, VendorUpdate};
use shared::util::normalize_email;

impl Record for Vendor {
    const STORAGE_KEY: &'static str = keys::VENDORS;
    const RESOURCE: &'static str = "Vendor";

    fn id(&self) -> i64 {
        self.id
    }
}

trait VendorRules {
    fn validate(&self) -> AppResult<()>;
}

impl VendorRules for Vendor {
    fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.name, "name", MAX_NAME_LEN)?;
        validate_email(&self.contact_email, "contact_email")?;
        validate_optional_text(&self.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&self.service, "service", MAX_SHORT_TEXT_LEN)?;
        validate_amount(self.contract_value, "contract_value")
    }
}

impl Governed for Vendor {
    type Create = VendorCreate;
    type Update = VendorUpdate;

    const POLICY: ModulePolicy = ModulePolicy {
        name: "vendors",
        view: Access::Capability(Capability::ViewWorkforce),
        create: Access::Capability(Capability::ManageVendors),
        edit: Access::Capability(Capability::ManageVendors),
        delete: Access::Capability(Capability::ManageVendors),
    };

    fn build(id: i64, now: i64, input: VendorCreate) -> AppResult<Self> {
        let vendor = Vendor {
            id,
            name: input.name.trim().to_string(),
            contact_email: normalize_email(&input.contact_email),
            phone: input.phone,
            service: input.service.trim().to_string(),
            contract_value: input.contract_value,
            status: EngagementStatus::Active,
            created_at: now,
            updated_at: now,
        };
        vendor.validate()?;
        Ok(vendor)
    }

    fn apply(&mut self, patch: VendorUpdate, now: i64) -> AppResult<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = patch.contact_email {
            next.contact_email = normalize_email(&email);
        }
        if patch.phone.is_some() {
            next.phone = patch.phone;
        }
        if let Some(service) = patch.service {
            next.service = service.trim().to_string();
        }
        if let Some(value) = patch.contract_value {
            next.contract_value = value;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl FeatureModule<Vendor> {
    /// Vendors currently under contract
    pub fn active_vendors(&self) -> AppResult<Vec<Vendor>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|v| v.status == EngagementStatus::Active)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::Fixture;
    use crate::services::NoticeKind;
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;

    fn input() -> VendorCreate {
        VendorCreate {
            name: "Acme Cleaning".into(),
            contact_email: "Ops@Acme.test".into(),
            phone: Some("+34 600 000 000".into()),
            service: "Cleaning".into(),
            contract_value: Decimal::new(1200000, 2),
        }
    }

    #[test]
    fn test_employee_cannot_manage_vendors() {
        let fx = Fixture::new();
        let vendors = fx.module::<Vendor>();
        fx.login(&fx.employee);

        let view = vendors.enter();
        assert!(view.records.is_empty());
        assert!(!view.flags.can_view);
        assert!(!view.flags.can_create);

        let err = vendors.create(input()).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(vendors.notice().unwrap().kind, NoticeKind::Error);
        assert!(vendors.is_empty());
    }

    #[test]
    fn test_hr_manages_vendors_manager_views() {
        let fx = Fixture::new();
        let vendors = fx.module::<Vendor>();

        fx.login(&fx.hr);
        let created = vendors.create(input()).unwrap();
        assert_eq!(created.contact_email, "ops@acme.test");
        assert_eq!(vendors.notice().unwrap().kind, NoticeKind::Success);

        fx.login(&fx.manager);
        let view = vendors.enter();
        assert_eq!(view.records.len(), 1);
        assert!(view.flags.can_view);
        assert!(!view.flags.can_edit);
        let err = vendors
            .update(created.id, VendorUpdate {
                status: Some(EngagementStatus::Inactive),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        fx.login(&fx.admin);
        let updated = vendors
            .update(created.id, VendorUpdate {
                status: Some(EngagementStatus::Inactive),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.status, EngagementStatus::Inactive);
        assert!(vendors.active_vendors().unwrap().is_empty());

        vendors.remove(created.id).unwrap();
        assert!(vendors.is_empty());
    }

    #[test]
    fn test_validation_names_field() {
        let fx = Fixture::new();
        let vendors = fx.module::<Vendor>();
        fx.login(&fx.hr);

        let err = vendors
            .create(VendorCreate {
                contract_value: Decimal::new(-5, 0),
                ..input()
            })
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "contract_value");

        let err = vendors
            .create(VendorCreate {
                contract_value: Decimal::MAX,
                ..input()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = vendors
            .create(VendorCreate {
                name: " ".into(),
                ..input()
            })
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "name");
        assert!(vendors.is_empty());
    }

    #[test]
    fn test_failed_update_leaves_record_untouched() {
        let fx = Fixture::new();
        let vendors = fx.module::<Vendor>();
        fx.login(&fx.hr);
        let created = vendors.create(input()).unwrap();

        let err = vendors
            .update(created.id, VendorUpdate {
                contact_email: Some("broken".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.detail("field").unwrap(), "contact_email");
        assert_eq!(vendors.get(created.id).unwrap(), created);
    }
}
