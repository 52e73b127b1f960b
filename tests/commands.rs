// SPDX-License-Identifier: Apache-2.0

//! End-to-end command behavior against real temporary projects.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treewright::commands::{
    CwdArg, add_field, create_file, create_mapped_class, create_repository, get_main_class,
    mapped_class_info, mapped_classes, rename_type,
};
use treewright::lang::java::template::TemplateKind;
use treewright::lang::{SourceKind, SupportedLanguage};

const JAVA: SupportedLanguage = SupportedLanguage::Java;

fn cwd_arg(dir: &TempDir) -> CwdArg {
    CwdArg {
        cwd: dir.path().to_path_buf(),
    }
}

fn json_of<T: serde::Serialize>(envelope: &T) -> Value {
    serde_json::to_value(envelope).unwrap()
}

fn write_file(dir: &Path, relative: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn rename_type_renames_class_and_file() {
    let dir = TempDir::new().unwrap();
    let original = write_file(dir.path(), "Original.java", "public class Original {}\n");

    let envelope = rename_type::run(
        JAVA,
        &rename_type::RenameTypeArgs {
            cwd: cwd_arg(&dir),
            file_path: original.clone(),
            new_name: "Renamed".into(),
            line: 1,
            column: 14,
        },
    );

    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(true));
    let renamed_path = json["data"]["filePath"].as_str().unwrap();
    assert!(renamed_path.ends_with("Renamed.java"));

    assert!(!original.exists());
    let renamed = dir.path().join("Renamed.java");
    assert!(renamed.exists());
    assert_eq!(
        fs::read_to_string(renamed).unwrap(),
        "public class Renamed {}\n"
    );
}

#[test]
fn rename_type_rejects_non_class_positions() {
    let dir = TempDir::new().unwrap();
    let file = write_file(
        dir.path(),
        "A.java",
        "public class A {\n    int field;\n}\n",
    );

    let envelope = rename_type::run(
        JAVA,
        &rename_type::RenameTypeArgs {
            cwd: cwd_arg(&dir),
            file_path: file,
            new_name: "B".into(),
            line: 2,
            column: 9,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(false));
    assert!(
        json["errorReason"]
            .as_str()
            .unwrap()
            .contains("not a class name")
    );
}

#[test]
fn create_file_renders_template_into_package_directory() {
    let dir = TempDir::new().unwrap();
    let envelope = create_file::run(
        JAVA,
        &create_file::CreateFileArgs {
            cwd: cwd_arg(&dir),
            package: "com.x".into(),
            file_name: "U".into(),
            template: TemplateKind::Class,
            source_kind: SourceKind::Main,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(true));

    let created = dir.path().join("src/main/java/com/x/U.java");
    assert!(created.exists());
    assert_eq!(
        fs::read_to_string(created).unwrap(),
        "package com.x;\n\npublic class U {\n}\n"
    );
}

#[test]
fn create_file_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let existing = write_file(
        dir.path(),
        "src/main/java/com/x/U.java",
        "public class U {}\n",
    );
    let before = fs::read_to_string(&existing).unwrap();

    let envelope = create_file::run(
        JAVA,
        &create_file::CreateFileArgs {
            cwd: cwd_arg(&dir),
            package: "com.x".into(),
            file_name: "U".into(),
            template: TemplateKind::Class,
            source_kind: SourceKind::Main,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(false));
    let reason = json["errorReason"].as_str().unwrap();
    assert!(reason.starts_with("File already exists: "));
    assert!(reason.ends_with("U.java"));
    assert_eq!(fs::read_to_string(&existing).unwrap(), before);
}

#[test]
fn create_file_rejects_bad_package_without_touching_disk() {
    let dir = TempDir::new().unwrap();
    let envelope = create_file::run(
        JAVA,
        &create_file::CreateFileArgs {
            cwd: cwd_arg(&dir),
            package: "com..x".into(),
            file_name: "U".into(),
            template: TemplateKind::Class,
            source_kind: SourceKind::Main,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(false));
    assert!(!dir.path().join("src").exists());
}

#[test]
fn create_mapped_class_adds_markers_and_imports() {
    let dir = TempDir::new().unwrap();
    let envelope = create_mapped_class::run(
        JAVA,
        &create_mapped_class::CreateMappedClassArgs {
            cwd: cwd_arg(&dir),
            package: "com.shop".into(),
            file_name: "OrderItem".into(),
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));

    let created = dir.path().join("src/main/java/com/shop/OrderItem.java");
    let content = fs::read_to_string(created).unwrap();
    assert!(content.contains("import jakarta.persistence.Entity;"));
    assert!(content.contains("import jakarta.persistence.Table;"));
    assert!(content.contains("@Entity\n@Table(name = \"order_item\")\npublic class OrderItem {"));
}

#[test]
fn create_mapped_class_refuses_duplicate_entities() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/main/java/com/a/User.java",
        "package com.a;\n\n@Entity\npublic class User {\n}\n",
    );

    let envelope = create_mapped_class::run(
        JAVA,
        &create_mapped_class::CreateMappedClassArgs {
            cwd: cwd_arg(&dir),
            package: "com.b".into(),
            file_name: "User".into(),
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(false));
    assert!(json["errorReason"].as_str().unwrap().contains("User.java"));
    assert!(!dir.path().join("src/main/java/com/b/User.java").exists());
}

#[test]
fn add_field_inserts_after_last_field_with_imports() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/User.java",
        "package com.x;\n\npublic class User {\n    private Long id;\n}\n",
    );

    let envelope = add_field::run(
        JAVA,
        &add_field::AddFieldArgs {
            cwd: cwd_arg(&dir),
            file_path: entity.clone(),
            source: None,
            field_name: "createdAt".into(),
            field_type: "Instant".into(),
            modifiers: vec!["private".into()],
            annotations: vec![],
            column_name: Some("created_at".into()),
            length: None,
            nullable: Some(false),
            unique: None,
            initializer: None,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));

    let content = fs::read_to_string(entity).unwrap();
    assert!(content.contains("import jakarta.persistence.Column;"));
    assert!(content.contains("import java.time.Instant;"));
    assert!(content.contains(
        "    private Long id;\n    @Column(name = \"created_at\", nullable = false)\n    private Instant createdAt;\n"
    ));
}

#[test]
fn add_field_accepts_an_unsaved_buffer() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/User.java",
        "package com.x;\n\npublic class User {\n}\n",
    );
    // The on-disk file is stale; the editor buffer already has a field.
    let buffer = "package com.x;\n\npublic class User {\n    private Long id;\n}\n";

    let envelope = add_field::run(
        JAVA,
        &add_field::AddFieldArgs {
            cwd: cwd_arg(&dir),
            file_path: entity.clone(),
            source: Some(BASE64.encode(buffer)),
            field_name: "name".into(),
            field_type: "String".into(),
            modifiers: vec!["private".into()],
            annotations: vec![],
            column_name: None,
            length: None,
            nullable: None,
            unique: None,
            initializer: None,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));

    let content = fs::read_to_string(entity).unwrap();
    assert!(content.contains("private Long id;\n    private String name;\n"));
}

#[test]
fn add_field_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "User.java",
        "public class User {\n    private Long id;\n}\n",
    );

    let envelope = add_field::run(
        JAVA,
        &add_field::AddFieldArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            source: None,
            field_name: "id".into(),
            field_type: "Long".into(),
            modifiers: vec!["private".into()],
            annotations: vec![],
            column_name: None,
            length: None,
            nullable: None,
            unique: None,
            initializer: None,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(false));
}

#[test]
fn create_repository_for_local_id() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/User.java",
        "package com.x;\n\nimport jakarta.persistence.Entity;\nimport jakarta.persistence.Id;\n\n@Entity\npublic class User {\n    @Id\n    private Long id;\n}\n",
    );

    let envelope = create_repository::run(
        JAVA,
        &create_repository::CreateRepositoryArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            superclass_source: None,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(true));
    assert!(
        json["data"]["filePath"]
            .as_str()
            .unwrap()
            .ends_with("UserRepository.java")
    );

    let content =
        fs::read_to_string(dir.path().join("src/main/java/com/x/UserRepository.java")).unwrap();
    assert!(content.contains("package com.x;"));
    assert!(
        content.contains("import org.springframework.data.jpa.repository.JpaRepository;")
    );
    assert!(
        content.contains("public interface UserRepository extends JpaRepository<User, Long> {")
    );
    // Long lives in java.lang and needs no import.
    assert!(!content.contains("import java.lang.Long;"));
}

#[test]
fn create_repository_imports_non_lang_id_types() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/Session.java",
        "package com.x;\n\nimport java.util.UUID;\n\n@Entity\npublic class Session {\n    @Id\n    private UUID id;\n}\n",
    );

    let envelope = create_repository::run(
        JAVA,
        &create_repository::CreateRepositoryArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            superclass_source: None,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));

    let content =
        fs::read_to_string(dir.path().join("src/main/java/com/x/SessionRepository.java")).unwrap();
    assert!(content.contains("import java.util.UUID;"));
    assert!(content.contains("extends JpaRepository<Session, UUID> {"));
}

#[test]
fn create_repository_requests_missing_supertype_source() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/Order.java",
        "package com.x;\n\n@Entity\npublic class Order extends Auditable {\n}\n",
    );

    let envelope = create_repository::run(
        JAVA,
        &create_repository::CreateRepositoryArgs {
            cwd: cwd_arg(&dir),
            file_path: entity.clone(),
            superclass_source: None,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(false));
    assert!(json["errorReason"].as_str().unwrap().contains("Auditable"));
    assert_eq!(json["data"]["requiresSymbolSource"], Value::Bool(true));
    assert_eq!(json["data"]["symbol"], Value::String("Auditable".into()));

    // Retrying with the supertype source succeeds.
    let supplied = "@MappedSuperclass\npublic abstract class Auditable {\n    @Id\n    private Long id;\n}\n";
    let envelope = create_repository::run(
        JAVA,
        &create_repository::CreateRepositoryArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            superclass_source: Some(BASE64.encode(supplied)),
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));
    let content =
        fs::read_to_string(dir.path().join("src/main/java/com/x/OrderRepository.java")).unwrap();
    assert!(content.contains("extends JpaRepository<Order, Long> {"));
}

#[test]
fn create_repository_follows_project_supertypes() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/main/java/com/x/Auditable.java",
        "package com.x;\n\n@MappedSuperclass\npublic abstract class Auditable {\n    @Id\n    private Long id;\n}\n",
    );
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/Order.java",
        "package com.x;\n\n@Entity\npublic class Order extends Auditable {\n}\n",
    );

    let envelope = create_repository::run(
        JAVA,
        &create_repository::CreateRepositoryArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            superclass_source: None,
        },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(true));
}

#[test]
fn get_main_class_finds_the_entry_point() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/main/java/com/x/Helper.java",
        "package com.x;\n\npublic class Helper {\n    void help() {}\n}\n",
    );
    write_file(
        dir.path(),
        "src/main/java/com/x/App.java",
        "package com.x;\n\npublic class App {\n    public static void main(String[] args) {}\n}\n",
    );

    let envelope = get_main_class::run(
        JAVA,
        &get_main_class::GetMainClassArgs { cwd: cwd_arg(&dir) },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(true));
    assert_eq!(json["data"]["className"], Value::String("App".into()));
    assert_eq!(json["data"]["package"], Value::String("com.x".into()));
    assert!(json["data"]["filePath"].as_str().unwrap().ends_with("App.java"));
}

#[test]
fn get_main_class_reports_not_found() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/main/java/com/x/Helper.java",
        "package com.x;\n\npublic class Helper {}\n",
    );

    let envelope = get_main_class::run(
        JAVA,
        &get_main_class::GetMainClassArgs { cwd: cwd_arg(&dir) },
    );
    assert_eq!(json_of(&envelope)["succeed"], Value::Bool(false));
}

#[test]
fn mapped_class_scans_separate_entities_from_superclasses() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/main/java/com/x/User.java",
        "package com.x;\n\n@Entity\n@Table(name = \"users\")\npublic class User {\n    @Id\n    private Long id;\n}\n",
    );
    write_file(
        dir.path(),
        "src/main/java/com/x/Auditable.java",
        "package com.x;\n\n@MappedSuperclass\npublic abstract class Auditable {\n}\n",
    );
    write_file(
        dir.path(),
        "src/main/java/com/x/Plain.java",
        "package com.x;\n\npublic class Plain {\n}\n",
    );

    let args = mapped_classes::MappedClassesArgs { cwd: cwd_arg(&dir) };
    let entities = json_of(&mapped_classes::run_mapped_classes(JAVA, &args));
    assert_eq!(entities["succeed"], Value::Bool(true));
    let data = entities["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["className"], Value::String("User".into()));
    assert_eq!(data[0]["package"], Value::String("com.x".into()));
    assert_eq!(data[0]["idType"], Value::String("Long".into()));
    assert_eq!(data[0]["idTypePackage"], Value::String("java.lang".into()));
    let annotations = data[0]["annotations"].as_array().unwrap();
    assert!(annotations.contains(&Value::String("ENTITY".into())));
    assert!(annotations.contains(&Value::String("TABLE".into())));

    let superclasses = json_of(&mapped_classes::run_mapped_superclasses(JAVA, &args));
    let data = superclasses["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["className"], Value::String("Auditable".into()));
    // No id anywhere in its hierarchy: the optional fields are omitted.
    assert!(data[0].get("idType").is_none());
}

#[test]
fn mapped_class_info_reports_id_and_repository() {
    let dir = TempDir::new().unwrap();
    let entity = write_file(
        dir.path(),
        "src/main/java/com/x/Session.java",
        "package com.x;\n\nimport java.util.UUID;\n\n@Entity\npublic class Session {\n    @Id\n    private UUID id;\n}\n",
    );

    let envelope = mapped_class_info::run(
        JAVA,
        &mapped_class_info::MappedClassInfoArgs {
            cwd: cwd_arg(&dir),
            file_path: entity,
            superclass_source: None,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(true));
    let data = &json["data"];
    assert_eq!(data["className"], Value::String("Session".into()));
    assert_eq!(data["idType"], Value::String("UUID".into()));
    assert_eq!(data["idTypePackage"], Value::String("java.util".into()));
    assert_eq!(
        data["repositoryName"],
        Value::String("SessionRepository".into())
    );
    assert_eq!(data["repositoryPackage"], Value::String("com.x".into()));
    let recommended = data["recommendedIdTypes"].as_array().unwrap();
    assert!(recommended.contains(&Value::String("java.util.UUID".into())));
    assert!(recommended.contains(&Value::String("java.lang.Long".into())));
}

#[test]
fn mapped_class_info_rejects_unmapped_classes() {
    let dir = TempDir::new().unwrap();
    let plain = write_file(
        dir.path(),
        "src/main/java/com/x/Plain.java",
        "package com.x;\n\npublic class Plain {\n}\n",
    );

    let envelope = mapped_class_info::run(
        JAVA,
        &mapped_class_info::MappedClassInfoArgs {
            cwd: cwd_arg(&dir),
            file_path: plain,
            superclass_source: None,
        },
    );
    let json = json_of(&envelope);
    assert_eq!(json["succeed"], Value::Bool(false));
    assert!(json["errorReason"].as_str().unwrap().contains("@Entity"));
}
