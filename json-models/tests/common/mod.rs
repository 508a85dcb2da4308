//! Fixture models shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use json_models::{
    json_model, BoolField, CharField, Collection, DateField, FloatField, IntField, Manager,
    MockTransport, Model, ModelError,
};

json_model! {
    /// A street address, nested inside `MyModel` and queryable on its own.
    pub struct Address {
        number: IntField = IntField::new("number") => set_number,
        street: CharField = CharField::new("street") => set_street,
        city: CharField = CharField::new("city") => set_city,
        foobars: Collection<String> = Collection::new("foobars") => set_foobars,
    }
    finders {
        (number) => "http://address/number/%s",
        (number, street) => "http://address/number/%s/street/%s",
        (city) => "http://localhost:8998/address/%s",
        (street, "stringfield") => "http://address/street/%s/stringfield/%s",
    }
}

json_model! {
    pub struct MyModel {
        muppet_name: CharField = CharField::new("kiddie.value") => set_muppet_name,
        muppet_type: CharField = CharField::new("kiddie.type").with_default("frog"),
        muppet_hair: CharField = CharField::new("kiddie.looks.head.hair").with_default("fuzzy"),
        muppet_nose: CharField = CharField::new("kiddie.looks.head.nose"),
        muppet_names: Collection<String> = Collection::new("kiddie.names") => set_muppet_names,
        muppet_ages: Collection<i64> = Collection::new("kiddie.ages"),
        muppet_addresses: Collection<Address> =
            Collection::new("kiddie.address").order_by("number") => set_muppet_addresses,
        opened: DateField = DateField::new("kiddie.opened") => set_opened,
        is_frog: BoolField = BoolField::new("kiddie.is_frog") => set_is_frog,
        height: FloatField = FloatField::new("kiddie.height").with_default(1.5),
    }
    finders {
        (muppet_name) => "http://foo.com/muppets/%s",
    }
}

json_model! {
    pub struct Simple {
        field1: CharField = CharField::new("field1"),
    }
    finders {
        (field1) => "http://foo.com/simple/%s",
    }
    headers {
        "user" => "user1",
        "password" => "pwd1",
    }
}

json_model! {
    pub struct SimpleWithoutFinder {
        field1: CharField = CharField::new("field1"),
    }
}

json_model! {
    pub struct MyValidatingModel {
        muppet_name: CharField = CharField::new("kiddie.value"),
        muppet_type: CharField = CharField::new("kiddie.type").with_default("frog"),
        muppet_names: Collection<String> = Collection::new("kiddie.names"),
        muppet_ages: Collection<i64> = Collection::new("kiddie.ages"),
        muppet_addresses: Collection<Address> =
            Collection::new("kiddie.address").order_by("number"),
    }
    finders {
        (muppet_name) => "http://foo.com/muppets/%s",
    }
    validate = MyValidatingModel::require_name;
}

impl MyValidatingModel {
    fn require_name(&self) -> Result<(), ModelError> {
        match self.muppet_name()? {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(ModelError::Validation("What, no muppet name?".to_string())),
        }
    }
}

/// A manager for `M` whose transport answers every GET with `mock`'s canned response.
pub fn manager_with<M: Model>(mock: &Arc<MockTransport>) -> Manager<M> {
    Manager::with_transport(M::model_type(), mock.clone())
}

pub const TWO_ADDRESSES: &str = r#"{"kiddie":{ "address": [{"number" :10,"street": "1st Ave. South", "city": "MuppetVille", "foobars" : ["foo","bar"]},{"number": 5, "street": "Mockingbird Lane", "city": "Bedrock"}]}}"#;
