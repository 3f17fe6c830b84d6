//! Fixture entities shared by the integration tests.

use chrono::NaiveDate;
use rowmap::{
    bail,
    schema::{EntityDecl, FieldDecl, FieldTy, RelationDecl},
    Collection, DbEnum, Entity, FieldValue, Id, Item, Result, Value,
};

#[derive(Debug, Default)]
pub struct Company {
    pub id: Option<i64>,
    pub name: String,
    pub founded: Option<NaiveDate>,
    pub employees: Collection<Person>,
}

impl Company {
    pub fn new(name: &str) -> Company {
        Company {
            name: name.to_string(),
            ..Company::default()
        }
    }
}

impl Entity for Company {
    fn declare() -> EntityDecl {
        EntityDecl::new("companies")
            .field(FieldDecl::new("id").ty(FieldTy::Int).auto_increment())
            .field(FieldDecl::new("name").mapped())
            .field(FieldDecl::new("founded").ty(FieldTy::Date).nullable())
            .field(
                FieldDecl::new("employees")
                    .relation(RelationDecl::one_to_many::<Person>("company_id").our_column("id")),
            )
    }

    fn blank() -> Self {
        Company::default()
    }

    fn id(&self) -> Option<Id> {
        self.id.map(Id::from)
    }

    fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        match name {
            "id" => self.id = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "founded" => self.founded = value.try_into()?,
            "employees" => self.employees = value.into_collection()?,
            _ => bail!("unknown field `{name}`"),
        }
        Ok(())
    }

    fn dump_field(&self, name: &str) -> Result<FieldValue> {
        Ok(match name {
            "id" => self.id.into(),
            "name" => self.name.clone().into(),
            "founded" => self.founded.into(),
            _ => bail!("unknown field `{name}`"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Active,
    Retired,
}

impl DbEnum for Status {
    fn variants() -> Vec<Value> {
        vec![Status::Active.to_value(), Status::Retired.to_value()]
    }

    fn to_value(&self) -> Value {
        match self {
            Status::Active => Value::from("active"),
            Status::Retired => Value::from("retired"),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "active" => Some(Status::Active),
            "retired" => Some(Status::Retired),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Person {
    pub id: Option<i64>,
    pub name: String,
    pub status: Status,
    pub company: Option<Item<Company>>,
}

impl Person {
    pub fn new(name: &str) -> Person {
        Person {
            id: None,
            name: name.to_string(),
            status: Status::Active,
            company: None,
        }
    }
}

impl Entity for Person {
    fn declare() -> EntityDecl {
        EntityDecl::new("people")
            .field(FieldDecl::new("id").ty(FieldTy::Int).auto_increment())
            .field(FieldDecl::new("name").mapped())
            .field(FieldDecl::new("status").enumeration::<Status>())
            .field(
                FieldDecl::new("company")
                    .column("company_id")
                    .nullable()
                    .relation(RelationDecl::many_to_one::<Company>("id")),
            )
    }

    fn blank() -> Self {
        Person::new("")
    }

    fn id(&self) -> Option<Id> {
        self.id.map(Id::from)
    }

    fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        match name {
            "id" => self.id = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "status" => self.status = value.into_enum()?,
            "company" => self.company = value.into_option_item()?,
            _ => bail!("unknown field `{name}`"),
        }
        Ok(())
    }

    fn dump_field(&self, name: &str) -> Result<FieldValue> {
        Ok(match name {
            "id" => self.id.into(),
            "name" => self.name.clone().into(),
            "status" => FieldValue::from_enum(&self.status),
            "company" => (&self.company).into(),
            _ => bail!("unknown field `{name}`"),
        })
    }
}

/// Keyed by an application-assigned code.
#[derive(Debug, Default)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Country {
    pub fn new(code: &str, name: &str) -> Country {
        Country {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

impl Entity for Country {
    fn declare() -> EntityDecl {
        EntityDecl::new("countries")
            .field(FieldDecl::new("code").mapped().id())
            .field(FieldDecl::new("name").mapped())
    }

    fn blank() -> Self {
        Country::default()
    }

    fn id(&self) -> Option<Id> {
        if self.code.is_empty() {
            None
        } else {
            Some(Id::from(self.code.as_str()))
        }
    }

    fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        match name {
            "code" => self.code = value.try_into()?,
            "name" => self.name = value.try_into()?,
            _ => bail!("unknown field `{name}`"),
        }
        Ok(())
    }

    fn dump_field(&self, name: &str) -> Result<FieldValue> {
        Ok(match name {
            "code" => self.code.clone().into(),
            "name" => self.name.clone().into(),
            _ => bail!("unknown field `{name}`"),
        })
    }
}

/// Keyed by the person it belongs to.
#[derive(Debug, Default)]
pub struct Profile {
    pub person: Option<Item<Person>>,
    pub bio: String,
}

impl Profile {
    pub fn new(person: impl Into<Item<Person>>, bio: &str) -> Profile {
        Profile {
            person: Some(person.into()),
            bio: bio.to_string(),
        }
    }
}

impl Entity for Profile {
    fn declare() -> EntityDecl {
        EntityDecl::new("profiles")
            .field(
                FieldDecl::new("person")
                    .column("person_id")
                    .id()
                    .relation(RelationDecl::one_to_one::<Person>("id")),
            )
            .field(FieldDecl::new("bio").mapped())
    }

    fn blank() -> Self {
        Profile::default()
    }

    fn id(&self) -> Option<Id> {
        self.person.as_ref().and_then(|person| person.id().ok())
    }

    fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        match name {
            "person" => self.person = value.into_option_item()?,
            "bio" => self.bio = value.try_into()?,
            _ => bail!("unknown field `{name}`"),
        }
        Ok(())
    }

    fn dump_field(&self, name: &str) -> Result<FieldValue> {
        Ok(match name {
            "person" => (&self.person).into(),
            "bio" => self.bio.clone().into(),
            _ => bail!("unknown field `{name}`"),
        })
    }
}
