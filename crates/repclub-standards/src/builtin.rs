//! Built-in module configs shipped with the importer.

use repclub_model::{FieldDefinition, FieldType, ModuleConfig};

const DAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// All built-in modules, in menu order.
pub fn builtin_modules() -> Vec<ModuleConfig> {
    vec![members(), leads(), staff(), products(), classes()]
}

fn members() -> ModuleConfig {
    ModuleConfig {
        module: "members".to_string(),
        display_name: "Members".to_string(),
        table_name: "members".to_string(),
        fields: vec![
            FieldDefinition::new("first_name", "First Name", FieldType::Text)
                .required()
                .with_examples(&["Jane", "Marcus"]),
            FieldDefinition::new("last_name", "Last Name", FieldType::Text)
                .required()
                .with_examples(&["Doe", "Lee"]),
            FieldDefinition::new("email", "Email", FieldType::Email)
                .required()
                .with_examples(&["jane.doe@example.com", "marcus.lee@example.com"]),
            FieldDefinition::new("phone", "Phone", FieldType::Phone)
                .with_examples(&["+1 555 0100", "+1 555 0199"]),
            FieldDefinition::new("date_of_birth", "Date of Birth", FieldType::Date)
                .with_examples(&["1990-04-12", "1985-11-30"]),
            FieldDefinition::new("gender", "Gender", FieldType::Select)
                .with_options(&["male", "female", "other"])
                .with_examples(&["female", "male"]),
            FieldDefinition::new("membership_type", "Membership Type", FieldType::Select)
                .with_options(&["basic", "premium", "vip", "student"])
                .with_examples(&["premium", "basic"]),
            FieldDefinition::new("join_date", "Join Date", FieldType::Date)
                .with_examples(&["2024-01-15", "2023-09-02"]),
            FieldDefinition::new(
                "emergency_contact_name",
                "Emergency Contact Name",
                FieldType::Text,
            )
            .with_examples(&["John Doe"]),
            FieldDefinition::new(
                "emergency_contact_phone",
                "Emergency Contact Phone",
                FieldType::Phone,
            )
            .with_examples(&["+1 555 0111"]),
            FieldDefinition::new("notes", "Notes", FieldType::Text),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "email".to_string(),
        template_file_name: "members_import_template.csv".to_string(),
    }
}

fn leads() -> ModuleConfig {
    ModuleConfig {
        module: "leads".to_string(),
        display_name: "Leads".to_string(),
        table_name: "leads".to_string(),
        fields: vec![
            FieldDefinition::new("first_name", "First Name", FieldType::Text)
                .required()
                .with_examples(&["Ana", "Tom"]),
            FieldDefinition::new("last_name", "Last Name", FieldType::Text)
                .with_examples(&["Silva", "Becker"]),
            FieldDefinition::new("email", "Email", FieldType::Email)
                .with_examples(&["ana@example.com", "tom@example.com"]),
            FieldDefinition::new("phone", "Phone", FieldType::Phone)
                .with_examples(&["+1 555 0142"]),
            FieldDefinition::new("source", "Lead Source", FieldType::Select)
                .with_options(&[
                    "walk_in",
                    "referral",
                    "website",
                    "social_media",
                    "event",
                    "other",
                ])
                .with_examples(&["website", "referral"]),
            FieldDefinition::new("status", "Status", FieldType::Select)
                .with_options(&["new", "contacted", "qualified", "converted", "lost"])
                .with_examples(&["new", "contacted"]),
            FieldDefinition::new("interest", "Interest", FieldType::Text)
                .with_examples(&["Personal training", "Yoga"]),
            FieldDefinition::new("notes", "Notes", FieldType::Text),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "first_name".to_string(),
        template_file_name: "leads_import_template.csv".to_string(),
    }
}

fn staff() -> ModuleConfig {
    ModuleConfig {
        module: "staff".to_string(),
        display_name: "Staff".to_string(),
        table_name: "staff".to_string(),
        fields: vec![
            FieldDefinition::new("first_name", "First Name", FieldType::Text)
                .required()
                .with_examples(&["Sam", "Priya"]),
            FieldDefinition::new("last_name", "Last Name", FieldType::Text)
                .required()
                .with_examples(&["Carter", "Nair"]),
            FieldDefinition::new("email", "Email", FieldType::Email)
                .required()
                .with_examples(&["sam@repclub.example", "priya@repclub.example"]),
            FieldDefinition::new("phone", "Phone", FieldType::Phone),
            FieldDefinition::new("role", "Role", FieldType::Select)
                .required()
                .with_options(&["trainer", "instructor", "front_desk", "manager", "admin"])
                .with_examples(&["trainer", "front_desk"]),
            FieldDefinition::new("hire_date", "Hire Date", FieldType::Date)
                .with_examples(&["2022-03-01"]),
            FieldDefinition::new("hourly_rate", "Hourly Rate", FieldType::Number)
                .with_range(Some(0.0), None)
                .with_examples(&["25.00", "18.50"]),
        ],
        duplicate_keys: vec!["email".to_string()],
        duplicate_display_field: "email".to_string(),
        template_file_name: "staff_import_template.csv".to_string(),
    }
}

fn products() -> ModuleConfig {
    ModuleConfig {
        module: "products".to_string(),
        display_name: "Products".to_string(),
        table_name: "products".to_string(),
        fields: vec![
            FieldDefinition::new("name", "Product Name", FieldType::Text)
                .required()
                .with_examples(&["Whey Protein 1kg", "Shaker Bottle"]),
            FieldDefinition::new("sku", "SKU", FieldType::Text)
                .with_examples(&["WP-1000", "SH-0500"]),
            FieldDefinition::new("category", "Category", FieldType::Text)
                .with_examples(&["Supplements", "Accessories"]),
            FieldDefinition::new("price", "Price", FieldType::Number)
                .required()
                .with_range(Some(0.0), None)
                .with_examples(&["39.90", "9.99"]),
            FieldDefinition::new("cost", "Cost", FieldType::Number)
                .with_range(Some(0.0), None)
                .with_examples(&["22.00", "3.10"]),
            FieldDefinition::new("stock_quantity", "Stock Quantity", FieldType::Integer)
                .with_range(Some(0.0), None)
                .with_examples(&["40", "120"]),
            FieldDefinition::new("description", "Description", FieldType::Text),
        ],
        duplicate_keys: vec!["sku".to_string()],
        duplicate_display_field: "name".to_string(),
        template_file_name: "products_import_template.csv".to_string(),
    }
}

fn classes() -> ModuleConfig {
    ModuleConfig {
        module: "classes".to_string(),
        display_name: "Classes".to_string(),
        table_name: "class_schedules".to_string(),
        fields: vec![
            FieldDefinition::new("name", "Class Name", FieldType::Text)
                .required()
                .with_examples(&["Morning Spin", "Power Yoga"]),
            FieldDefinition::new("instructor_email", "Instructor Email", FieldType::Email)
                .with_examples(&["priya@repclub.example"]),
            FieldDefinition::new("day_of_week", "Day of Week", FieldType::Select)
                .required()
                .with_options(DAYS)
                .with_examples(&["monday", "thursday"]),
            FieldDefinition::new("start_time", "Start Time", FieldType::Text)
                .required()
                .with_examples(&["06:30", "18:00"]),
            FieldDefinition::new("duration_minutes", "Duration (minutes)", FieldType::Integer)
                .required()
                .with_range(Some(1.0), Some(480.0))
                .with_examples(&["45", "60"]),
            FieldDefinition::new("capacity", "Capacity", FieldType::Integer)
                .with_range(Some(1.0), None)
                .with_examples(&["20", "12"]),
            FieldDefinition::new("room", "Room", FieldType::Text)
                .with_examples(&["Studio A", "Spin Room"]),
        ],
        duplicate_keys: vec![
            "name".to_string(),
            "day_of_week".to_string(),
            "start_time".to_string(),
        ],
        duplicate_display_field: "name".to_string(),
        template_file_name: "classes_import_template.csv".to_string(),
    }
}
