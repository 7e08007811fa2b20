//! Built-in multi-cloud Terraform generator.
//!
//! Renders one `# SECTION <PROVIDER_ID>` block per provider config, in spec
//! order. Baseline security settings are baked into every template: private
//! databases, encrypted storage, automatic backups, monitoring, and
//! credentials through sensitive variables.

use async_trait::async_trait;
use tracing::info;

use veriform_spec::{CloudProvider, InfrastructureSpec, ProviderConfig};

use crate::error::{IacError, IacResult};
use crate::generator::CodeGenerator;

/// Per-provider sizing and image defaults.
struct ProviderDefaults {
    region: &'static str,
    instance_size: &'static str,
    db_size: &'static str,
    image: &'static str,
}

fn defaults(provider: CloudProvider) -> ProviderDefaults {
    match provider {
        CloudProvider::Aws => ProviderDefaults {
            region: "us-east-1",
            instance_size: "t3.micro",
            db_size: "db.t3.micro",
            image: "ami-0c55b159cbfafe1f0",
        },
        CloudProvider::Azure => ProviderDefaults {
            region: "East US",
            instance_size: "Standard_B1s",
            db_size: "B_Gen5_1",
            image: "Canonical:UbuntuServer:18.04-LTS",
        },
        CloudProvider::Gcp => ProviderDefaults {
            region: "us-central1",
            instance_size: "e2-micro",
            db_size: "db-f1-micro",
            image: "debian-cloud/debian-11",
        },
        CloudProvider::OpenStack => ProviderDefaults {
            region: "RegionOne",
            instance_size: "m1.small",
            db_size: "db.small",
            image: "Ubuntu 20.04",
        },
    }
}

/// Terraform registry source for a provider.
fn provider_source(provider: CloudProvider) -> (&'static str, &'static str, &'static str) {
    match provider {
        CloudProvider::Aws => ("aws", "hashicorp/aws", "~> 5.0"),
        CloudProvider::Azure => ("azurerm", "hashicorp/azurerm", "~> 3.0"),
        CloudProvider::Gcp => ("google", "hashicorp/google", "~> 5.0"),
        CloudProvider::OpenStack => (
            "openstack",
            "terraform-provider-openstack/openstack",
            "~> 1.0",
        ),
    }
}

/// In-process Terraform renderer.
#[derive(Debug, Default)]
pub struct TerraformGenerator;

impl TerraformGenerator {
    pub fn new() -> Self {
        Self
    }

    fn render_section(config: &ProviderConfig) -> String {
        let mut blocks: Vec<String> = Vec::new();

        blocks.push(render_header(config));
        if config.networks > 0 {
            blocks.push(render_network(config));
        }
        for i in 0..config.security_groups {
            blocks.push(render_security_group(config, i + 1));
        }
        for i in 0..config.servers {
            blocks.push(render_server(config, i + 1));
        }
        for i in 0..config.databases {
            blocks.push(render_database(config, i + 1));
        }
        blocks.push(render_variables(config));

        blocks.join("\n")
    }
}

#[async_trait]
impl CodeGenerator for TerraformGenerator {
    async fn generate(&self, spec: &InfrastructureSpec) -> IacResult<String> {
        if spec.providers.is_empty() {
            return Err(IacError::EmptySpec);
        }

        info!(
            "Rendering Terraform for {} provider(s)",
            spec.providers.len()
        );

        let mut artifact = String::new();
        for config in &spec.providers {
            artifact.push_str(&format!(
                "# SECTION {}\n",
                config.provider.as_str().to_uppercase()
            ));
            artifact.push_str(&Self::render_section(config));
            artifact.push('\n');
        }
        Ok(artifact)
    }
}

fn render_header(config: &ProviderConfig) -> String {
    let d = defaults(config.provider);
    let (tf_name, source, version) = provider_source(config.provider);

    let provider_block = match config.provider {
        CloudProvider::Aws => format!(
            r#"provider "aws" {{
  region = "{region}"
}}"#,
            region = d.region
        ),
        CloudProvider::Azure => r#"provider "azurerm" {
  features {}
}"#
        .to_string(),
        CloudProvider::Gcp => format!(
            r#"provider "google" {{
  project = var.gcp_project_id
  region  = "{region}"
}}"#,
            region = d.region
        ),
        CloudProvider::OpenStack => r#"provider "openstack" {
  auth_url = var.openstack_auth_url
}"#
        .to_string(),
    };

    format!(
        r#"terraform {{
  required_version = ">= 1.0"

  required_providers {{
    {tf_name} = {{
      source  = "{source}"
      version = "{version}"
    }}
  }}
}}

{provider_block}
"#
    )
}

fn render_network(config: &ProviderConfig) -> String {
    match config.provider {
        CloudProvider::Aws => r#"resource "aws_vpc" "main" {
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {
    Name        = "main-vpc"
    Environment = "production"
  }
}

resource "aws_subnet" "private" {
  vpc_id     = aws_vpc.main.id
  cidr_block = "10.0.1.0/24"

  tags = {
    Name        = "private-subnet"
    Environment = "production"
  }
}
"#
        .to_string(),
        CloudProvider::Azure => {
            let d = defaults(config.provider);
            format!(
                r#"resource "azurerm_resource_group" "main" {{
  name     = "rg-infrastructure"
  location = "{location}"
}}

resource "azurerm_virtual_network" "main" {{
  name                = "vnet-main"
  address_space       = ["10.0.0.0/16"]
  location            = azurerm_resource_group.main.location
  resource_group_name = azurerm_resource_group.main.name
}}

resource "azurerm_subnet" "private" {{
  name                 = "subnet-private"
  resource_group_name  = azurerm_resource_group.main.name
  virtual_network_name = azurerm_virtual_network.main.name
  address_prefixes     = ["10.0.1.0/24"]
}}
"#,
                location = d.region
            )
        }
        CloudProvider::Gcp => {
            let d = defaults(config.provider);
            format!(
                r#"resource "google_compute_network" "main" {{
  name                    = "vpc-main"
  auto_create_subnetworks = false
}}

resource "google_compute_subnetwork" "private" {{
  name          = "subnet-private"
  ip_cidr_range = "10.0.1.0/24"
  region        = "{region}"
  network       = google_compute_network.main.id
}}
"#,
                region = d.region
            )
        }
        CloudProvider::OpenStack => r#"resource "openstack_networking_network_v2" "main" {
  name = "network-main"
}

resource "openstack_networking_subnet_v2" "private" {
  name       = "subnet-private"
  network_id = openstack_networking_network_v2.main.id
  cidr       = "10.0.1.0/24"
}
"#
        .to_string(),
    }
}

fn render_security_group(config: &ProviderConfig, index: u32) -> String {
    match config.provider {
        CloudProvider::Aws => format!(
            r#"resource "aws_security_group" "sg_{index}" {{
  name        = "sg-{index}"
  description = "Least-privilege security group {index}"
  vpc_id      = aws_vpc.main.id

  ingress {{
    description = "HTTPS"
    from_port   = 443
    to_port     = 443
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  egress {{
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }}
}}
"#
        ),
        CloudProvider::Azure => format!(
            r#"resource "azurerm_network_security_group" "sg_{index}" {{
  name                = "nsg-{index}"
  location            = azurerm_resource_group.main.location
  resource_group_name = azurerm_resource_group.main.name

  security_rule {{
    name                       = "allow-https"
    priority                   = 100
    direction                  = "Inbound"
    access                     = "Allow"
    protocol                   = "Tcp"
    source_port_range          = "*"
    destination_port_range     = "443"
    source_address_prefix      = "*"
    destination_address_prefix = "*"
  }}
}}
"#
        ),
        CloudProvider::Gcp => format!(
            r#"resource "google_compute_firewall" "sg_{index}" {{
  name    = "allow-https-{index}"
  network = google_compute_network.main.name

  allow {{
    protocol = "tcp"
    ports    = ["443"]
  }}

  source_ranges = ["0.0.0.0/0"]
}}
"#
        ),
        CloudProvider::OpenStack => format!(
            r#"resource "openstack_networking_secgroup_v2" "sg_{index}" {{
  name        = "sg-{index}"
  description = "Least-privilege security group {index}"
}}

resource "openstack_networking_secgroup_rule_v2" "sg_{index}_https" {{
  direction         = "ingress"
  ethertype         = "IPv4"
  protocol          = "tcp"
  port_range_min    = 443
  port_range_max    = 443
  remote_ip_prefix  = "0.0.0.0/0"
  security_group_id = openstack_networking_secgroup_v2.sg_{index}.id
}}
"#
        ),
    }
}

fn render_server(config: &ProviderConfig, index: u32) -> String {
    let d = defaults(config.provider);
    match config.provider {
        CloudProvider::Aws => format!(
            r#"resource "aws_instance" "server_{index}" {{
  ami           = "{image}"
  instance_type = "{size}"
  subnet_id     = aws_subnet.private.id

  vpc_security_group_ids = [aws_security_group.sg_1.id]

  root_block_device {{
    encrypted = true
  }}

  monitoring = true

  tags = {{
    Name        = "server-{index}"
    Environment = "production"
  }}
}}
"#,
            image = d.image,
            size = d.instance_size
        ),
        CloudProvider::Azure => format!(
            r#"resource "azurerm_network_interface" "nic_{index}" {{
  name                = "nic-{index}"
  location            = azurerm_resource_group.main.location
  resource_group_name = azurerm_resource_group.main.name

  ip_configuration {{
    name                          = "internal"
    subnet_id                     = azurerm_subnet.private.id
    private_ip_address_allocation = "Dynamic"
  }}
}}

resource "azurerm_linux_virtual_machine" "vm_{index}" {{
  name                = "vm-{index}"
  resource_group_name = azurerm_resource_group.main.name
  location            = azurerm_resource_group.main.location
  size                = "{size}"
  admin_username      = "adminuser"

  network_interface_ids = [azurerm_network_interface.nic_{index}.id]

  admin_ssh_key {{
    username   = "adminuser"
    public_key = var.ssh_public_key
  }}

  os_disk {{
    caching              = "ReadWrite"
    storage_account_type = "Standard_LRS"
  }}

  source_image_reference {{
    publisher = "Canonical"
    offer     = "UbuntuServer"
    sku       = "18.04-LTS"
    version   = "latest"
  }}
}}
"#,
            size = d.instance_size
        ),
        CloudProvider::Gcp => format!(
            r#"resource "google_compute_instance" "server_{index}" {{
  name         = "server-{index}"
  machine_type = "{size}"
  zone         = "{region}-a"

  boot_disk {{
    initialize_params {{
      image = "{image}"
    }}
  }}

  network_interface {{
    subnetwork = google_compute_subnetwork.private.id
  }}

  labels = {{
    environment = "production"
  }}
}}
"#,
            size = d.instance_size,
            region = d.region,
            image = d.image
        ),
        CloudProvider::OpenStack => format!(
            r#"resource "openstack_compute_instance_v2" "server_{index}" {{
  name        = "server-{index}"
  flavor_name = "{size}"
  image_name  = "{image}"

  network {{
    uuid = openstack_networking_network_v2.main.id
  }}

  security_groups = [openstack_networking_secgroup_v2.sg_1.name]
}}
"#,
            size = d.instance_size,
            image = d.image
        ),
    }
}

fn render_database(config: &ProviderConfig, index: u32) -> String {
    let d = defaults(config.provider);
    match config.provider {
        CloudProvider::Aws => format!(
            r#"resource "aws_db_instance" "db_{index}" {{
  identifier        = "db-{index}"
  engine            = "mysql"
  engine_version    = "8.0"
  instance_class    = "{size}"
  allocated_storage = 20

  db_name  = "mydb"
  username = "admin"
  password = var.db_password

  vpc_security_group_ids = [aws_security_group.sg_1.id]

  publicly_accessible = false
  storage_encrypted   = true

  enabled_cloudwatch_logs_exports = ["error", "general", "slowquery"]

  backup_retention_period = 7
}}
"#,
            size = d.db_size
        ),
        CloudProvider::Azure => format!(
            r#"resource "azurerm_mysql_server" "db_{index}" {{
  name                = "mysql-{index}"
  location            = azurerm_resource_group.main.location
  resource_group_name = azurerm_resource_group.main.name

  administrator_login          = "mysqladmin"
  administrator_login_password = var.db_password

  sku_name   = "{size}"
  storage_mb = 20480
  version    = "8.0"

  public_network_access_enabled    = false
  ssl_enforcement_enabled          = true
  ssl_minimal_tls_version_enforced = "TLS1_2"

  backup_retention_days = 7
}}
"#,
            size = d.db_size
        ),
        CloudProvider::Gcp => format!(
            r#"resource "google_sql_database_instance" "db_{index}" {{
  name             = "db-{index}"
  database_version = "MYSQL_8_0"
  region           = "{region}"

  settings {{
    tier = "{size}"

    ip_configuration {{
      ipv4_enabled = false
      require_ssl  = true
    }}

    insights_config {{
      query_insights_enabled = true
    }}

    backup_configuration {{
      enabled    = true
      start_time = "03:00"
    }}
  }}
}}
"#,
            region = d.region,
            size = d.db_size
        ),
        CloudProvider::OpenStack => format!(
            r#"resource "openstack_db_instance_v1" "db_{index}" {{
  name      = "db-{index}"
  flavor_id = "{size}"
  size      = 20

  datastore {{
    type    = "mysql"
    version = "8.0"
  }}
}}
"#,
            size = d.db_size
        ),
    }
}

fn render_variables(config: &ProviderConfig) -> String {
    let mut variables = Vec::new();

    if config.databases > 0 {
        variables.push(
            r#"variable "db_password" {
  description = "Database administrator password"
  type        = string
  sensitive   = true
}
"#
            .to_string(),
        );
    }

    match config.provider {
        CloudProvider::Azure if config.servers > 0 => {
            variables.push(
                r#"variable "ssh_public_key" {
  description = "SSH public key for VM access"
  type        = string
}
"#
                .to_string(),
            );
        }
        CloudProvider::Gcp => {
            variables.push(
                r#"variable "gcp_project_id" {
  type = string
}
"#
                .to_string(),
            );
        }
        CloudProvider::OpenStack => {
            variables.push(
                r#"variable "openstack_auth_url" {
  type = string
}
"#
                .to_string(),
            );
        }
        _ => {}
    }

    variables.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::parse_sections;
    use veriform_spec::RiskRequests;

    fn aws_config() -> ProviderConfig {
        ProviderConfig::new(CloudProvider::Aws)
            .with_servers(2)
            .with_databases(1)
            .with_networks(1)
            .with_security_groups(1)
    }

    #[tokio::test]
    async fn test_sections_in_spec_order() {
        let generator = TerraformGenerator::new();
        let spec = InfrastructureSpec::multi(vec![
            ProviderConfig::new(CloudProvider::Gcp).with_servers(1).with_networks(1),
            aws_config(),
        ]);

        let artifact = generator.generate(&spec).await.unwrap();
        let sections = parse_sections(&artifact);

        let keys: Vec<&str> = sections.keys().collect();
        assert_eq!(keys, vec!["gcp", "aws"]);
    }

    #[tokio::test]
    async fn test_aws_resources_rendered() {
        let generator = TerraformGenerator::new();
        let spec = InfrastructureSpec::single(aws_config());

        let artifact = generator.generate(&spec).await.unwrap();

        assert!(artifact.contains("# SECTION AWS"));
        assert!(artifact.contains("hashicorp/aws"));
        assert!(artifact.contains(r#"resource "aws_vpc" "main""#));
        assert!(artifact.contains(r#"resource "aws_instance" "server_1""#));
        assert!(artifact.contains(r#"resource "aws_instance" "server_2""#));
        assert!(artifact.contains(r#"resource "aws_db_instance" "db_1""#));
    }

    #[tokio::test]
    async fn test_secure_defaults_present() {
        let generator = TerraformGenerator::new();
        // Risky requests are recorded on the spec but never rendered: the
        // generated database stays private and encrypted regardless.
        let spec = InfrastructureSpec::single(aws_config().with_requests(RiskRequests {
            public_database: true,
            unencrypted_storage: true,
            open_ssh: true,
        }));

        let artifact = generator.generate(&spec).await.unwrap();

        assert!(artifact.contains("publicly_accessible = false"));
        assert!(artifact.contains("storage_encrypted   = true"));
        assert!(artifact.contains("backup_retention_period = 7"));
        assert!(!artifact.contains("publicly_accessible = true"));
    }

    #[tokio::test]
    async fn test_password_via_sensitive_variable() {
        let generator = TerraformGenerator::new();
        let spec = InfrastructureSpec::single(aws_config());

        let artifact = generator.generate(&spec).await.unwrap();

        assert!(artifact.contains("password = var.db_password"));
        assert!(artifact.contains("sensitive   = true"));
        assert!(!artifact.contains(r#"password = ""#));
    }

    #[tokio::test]
    async fn test_every_provider_renders() {
        let generator = TerraformGenerator::new();
        for provider in CloudProvider::all() {
            let spec = InfrastructureSpec::single(
                ProviderConfig::new(provider)
                    .with_servers(1)
                    .with_databases(1)
                    .with_networks(1)
                    .with_security_groups(1),
            );
            let artifact = generator.generate(&spec).await.unwrap();
            let sections = parse_sections(&artifact);
            assert_eq!(sections.len(), 1, "{} must render one section", provider);
            assert!(sections.get(provider.as_str()).is_some());
        }
    }

    #[tokio::test]
    async fn test_empty_spec_rejected() {
        let generator = TerraformGenerator::new();
        let spec = InfrastructureSpec::multi(vec![]);
        assert!(matches!(
            generator.generate(&spec).await,
            Err(IacError::EmptySpec)
        ));
    }
}
