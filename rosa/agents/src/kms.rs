//! Grants a cluster's roles use of the customer-managed KMS key it was created with.
//!
//! The inputs are read back from the cluster's description rather than from what was prepared
//! locally: the provisioning service decides the operator role names while it creates the
//! cluster.

use crate::error::{self, Result};
use fixture_model::{JsonDescription, KeyUse};
use serde_json::{json, Value};
use snafu::OptionExt;

const KEY_USE_ACTIONS: [&str; 5] = [
    "kms:Encrypt",
    "kms:Decrypt",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
    "kms:DescribeKey",
];

const KEY_GRANT_ACTIONS: [&str; 3] = ["kms:CreateGrant", "kms:ListGrants", "kms:RevokeGrant"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorRole {
    pub name: String,
    pub role_arn: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KmsPolicyInputs {
    pub key_arn: String,
    pub key_use: KeyUse,
    pub installer_role_arn: String,
    pub operator_roles: Vec<OperatorRole>,
    pub region: String,
    pub hosted_cp: bool,
}

impl KmsPolicyInputs {
    pub fn from_description(description: &JsonDescription, key_use: KeyUse) -> Result<Self> {
        let key_path = match key_use {
            KeyUse::Etcd => "aws.etcd_encryption.kms_key_arn",
            KeyUse::Volume => "aws.kms_key_arn",
        };
        let required = |path: &str| {
            description
                .str_at(path)
                .map(str::to_string)
                .context(error::MissingSnafu {
                    what: path,
                    from: "the cluster description",
                })
        };
        let operator_roles = description
            .array_at("aws.sts.operator_iam_roles")
            .iter()
            .filter_map(|role| {
                Some(OperatorRole {
                    name: role.get("name")?.as_str()?.to_string(),
                    role_arn: role.get("role_arn")?.as_str()?.to_string(),
                })
            })
            .collect();
        Ok(Self {
            key_arn: required(key_path)?,
            key_use,
            installer_role_arn: required("aws.sts.role_arn")?,
            operator_roles,
            region: required("region.id")?,
            hosted_cp: description.bool_at("hypershift.enabled"),
        })
    }

    /// The operator roles that use the key, by the credentials secret they are named after.
    fn operator_role_suffixes(&self) -> &'static [&'static str] {
        match (self.key_use, self.hosted_cp) {
            (KeyUse::Etcd, true) => &["kms-provider"],
            (KeyUse::Etcd, false) => &[],
            (KeyUse::Volume, true) => &[
                "kube-controller-manager",
                "capa-controller-manager",
                "ebs-cloud-credentials",
            ],
            (KeyUse::Volume, false) => &["ebs-cloud-credentials"],
        }
    }

    fn operator_role_arns(&self) -> Vec<String> {
        let suffixes = self.operator_role_suffixes();
        self.operator_roles
            .iter()
            .filter(|role| suffixes.iter().any(|suffix| role.name.ends_with(suffix)))
            .map(|role| role.role_arn.clone())
            .collect()
    }
}

/// The key policy statements that let the cluster's installer role and operator roles use the
/// key.
pub fn key_policy_statements(inputs: &KmsPolicyInputs) -> Vec<Value> {
    let mut statements = vec![
        json!({
            "Sid": "Allow ROSA use of the key",
            "Effect": "Allow",
            "Principal": { "AWS": [inputs.installer_role_arn] },
            "Action": KEY_USE_ACTIONS,
            "Resource": "*",
        }),
        json!({
            "Sid": "Allow attachment of persistent resources",
            "Effect": "Allow",
            "Principal": { "AWS": [inputs.installer_role_arn] },
            "Action": KEY_GRANT_ACTIONS,
            "Resource": "*",
            "Condition": { "Bool": { "kms:GrantIsForAWSResource": "true" } },
        }),
    ];

    let operator_roles = inputs.operator_role_arns();
    if operator_roles.is_empty() {
        return statements;
    }
    match inputs.key_use {
        KeyUse::Etcd => statements.push(json!({
            "Sid": "Allow the KMS provider to use the key",
            "Effect": "Allow",
            "Principal": { "AWS": operator_roles },
            "Action": ["kms:Encrypt", "kms:Decrypt", "kms:DescribeKey"],
            "Resource": "*",
        })),
        KeyUse::Volume => {
            let via_ec2 = json!({
                "StringEquals": {
                    "kms:ViaService": format!("ec2.{}.amazonaws.com", inputs.region)
                }
            });
            statements.push(json!({
                "Sid": "Allow the operators to use the key",
                "Effect": "Allow",
                "Principal": { "AWS": operator_roles },
                "Action": KEY_USE_ACTIONS,
                "Resource": "*",
                "Condition": via_ec2,
            }));
            statements.push(json!({
                "Sid": "Allow the operators to attach persistent resources",
                "Effect": "Allow",
                "Principal": { "AWS": operator_roles },
                "Action": ["kms:CreateGrant"],
                "Resource": "*",
                "Condition": {
                    "StringEquals": {
                        "kms:ViaService": format!("ec2.{}.amazonaws.com", inputs.region)
                    },
                    "Bool": { "kms:GrantIsForAWSResource": "true" },
                },
            }));
        }
    }
    statements
}

#[cfg(test)]
mod test {
    use super::*;

    fn description(hosted_cp: bool) -> JsonDescription {
        JsonDescription::new(json!({
            "region": { "id": "us-west-2" },
            "hypershift": { "enabled": hosted_cp },
            "aws": {
                "kms_key_arn": "arn:aws:kms:us-west-2:123:key/volume",
                "etcd_encryption": { "kms_key_arn": "arn:aws:kms:us-west-2:123:key/etcd" },
                "sts": {
                    "role_arn": "arn:aws:iam::123:role/ci-Installer-Role",
                    "operator_iam_roles": [
                        { "name": "ebs-cloud-credentials", "role_arn": "arn:ebs" },
                        { "name": "kube-controller-manager", "role_arn": "arn:kcm" },
                        { "name": "capa-controller-manager", "role_arn": "arn:capa" },
                        { "name": "kms-provider", "role_arn": "arn:kms" },
                        { "name": "cloud-credentials", "role_arn": "arn:ingress" },
                        { "role_arn": "arn:nameless" },
                    ]
                }
            }
        }))
    }

    fn principals(statement: &Value) -> Vec<&str> {
        statement["Principal"]["AWS"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn reads_inputs() {
        let inputs = KmsPolicyInputs::from_description(&description(true), KeyUse::Etcd).unwrap();
        assert_eq!(inputs.key_arn, "arn:aws:kms:us-west-2:123:key/etcd");
        assert_eq!(inputs.region, "us-west-2");
        assert!(inputs.hosted_cp);
        assert_eq!(inputs.operator_roles.len(), 5);

        let inputs =
            KmsPolicyInputs::from_description(&description(false), KeyUse::Volume).unwrap();
        assert_eq!(inputs.key_arn, "arn:aws:kms:us-west-2:123:key/volume");
        assert!(!inputs.hosted_cp);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = KmsPolicyInputs::from_description(
            &JsonDescription::new(json!({ "region": { "id": "us-west-2" } })),
            KeyUse::Volume,
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ExternalCall);
    }

    #[test]
    fn hosted_cp_volume_key() {
        let inputs = KmsPolicyInputs::from_description(&description(true), KeyUse::Volume).unwrap();
        let statements = key_policy_statements(&inputs);
        assert_eq!(statements.len(), 4);
        assert_eq!(
            principals(&statements[0]),
            vec!["arn:aws:iam::123:role/ci-Installer-Role"]
        );
        assert_eq!(
            principals(&statements[2]),
            vec!["arn:ebs", "arn:kcm", "arn:capa"]
        );
        assert_eq!(
            statements[2]["Condition"]["StringEquals"]["kms:ViaService"],
            "ec2.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn classic_volume_key() {
        let inputs =
            KmsPolicyInputs::from_description(&description(false), KeyUse::Volume).unwrap();
        let statements = key_policy_statements(&inputs);
        assert_eq!(principals(&statements[2]), vec!["arn:ebs"]);
    }

    #[test]
    fn etcd_key() {
        let inputs = KmsPolicyInputs::from_description(&description(true), KeyUse::Etcd).unwrap();
        let statements = key_policy_statements(&inputs);
        assert_eq!(statements.len(), 3);
        assert_eq!(principals(&statements[2]), vec!["arn:kms"]);

        let inputs = KmsPolicyInputs::from_description(&description(false), KeyUse::Etcd).unwrap();
        assert_eq!(key_policy_statements(&inputs).len(), 2);
    }
}
