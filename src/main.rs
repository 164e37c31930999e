//! easycert CLI application.
//!
//! This binary provides a command-line interface for creating and handling a
//! small certification authority through OpenSSL.

use clap::{Args, Parser, Subcommand};
use easycert::emit::{emit_bindings, Language};
use easycert::error::Result;
use easycert::layout::init::{local_hostname, setup_dir};
use easycert::layout::listing::list_lines;
use easycert::layout::paths::{ArtifactKind, NAME_CA};
use easycert::openssl::inspect::{self, InfoField};
use easycert::openssl::request::{
    build_ca, generate_crl, new_request, parse_hosts, revoke, sign_request, CaOptions,
    RequestOptions, SignOptions,
};
use easycert::settings::{RsaSize, Settings, DEFAULT_CA_YEARS, DEFAULT_YEARS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "easycert")]
#[command(about = "Generate and handle certificates", long_about = None)]
struct Cli {
    /// Root directory of the certificates (default: ~/.cert)
    #[arg(long, global = true, env = "EASYCERT_ROOT", value_name = "DIR")]
    root: Option<PathBuf>,

    /// OpenSSL executable (default: `openssl` found on PATH)
    #[arg(long, global = true, env = "EASYCERT_OPENSSL", value_name = "PATH")]
    openssl: Option<PathBuf>,

    /// Log every OpenSSL invocation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the directory structure to handle the certificates
    New {
        /// Also create the certification authority
        #[arg(long)]
        ca: bool,

        /// Size in bits for the CA's RSA key
        #[arg(long, requires = "ca", default_value_t = RsaSize::default())]
        rsa_size: RsaSize,

        /// Number of years the CA certificate is valid
        #[arg(long, requires = "ca", default_value_t = DEFAULT_CA_YEARS, value_parser = clap::value_parser!(u32).range(1..))]
        years: u32,

        /// CA subject (default: "/CN=<hostname> Certificate Authority")
        #[arg(long, requires = "ca")]
        subject: Option<String>,
    },

    /// Create the certification authority
    Ca {
        #[command(flatten)]
        ca_args: CaArgs,
    },

    /// Create a certificate request
    Req {
        /// Name of the certificate
        name: String,

        /// Size in bits for the RSA key
        #[arg(long, default_value_t = RsaSize::default())]
        rsa_size: RsaSize,

        /// Number of years the signed certificate is valid
        #[arg(long, requires = "sign", default_value_t = DEFAULT_YEARS, value_parser = clap::value_parser!(u32).range(1..))]
        years: u32,

        /// Comma-separated hostnames and IPs to generate a certificate for
        #[arg(long)]
        host: Option<String>,

        /// Subject, e.g. "/O=Example/CN=www.example.com" (default: /CN=NAME)
        #[arg(long)]
        subject: Option<String>,

        /// Sign the request once created
        #[arg(long)]
        sign: bool,

        /// Also write the certificate and key into a single file
        #[arg(long, requires = "sign")]
        combined: bool,
    },

    /// Sign a certificate request
    Sign {
        /// Name of the certificate request
        name: String,

        /// Number of years the certificate is valid
        #[arg(long, default_value_t = DEFAULT_YEARS, value_parser = clap::value_parser!(u32).range(1..))]
        years: u32,

        /// Also write the certificate and key into a single file
        #[arg(long)]
        combined: bool,
    },

    /// Revoke a signed certificate
    Revoke {
        /// Name of the certificate
        name: String,
    },

    /// Generate the certificate revocation list
    Crl,

    /// Check a certificate or a private key
    Check {
        #[command(flatten)]
        kind: KindArgs,

        /// Name in the certificates directory, or path of a file
        #[arg(value_name = "NAME|FILENAME")]
        target: String,
    },

    /// Show a certificate or a private key
    Cat {
        #[command(flatten)]
        kind: KindArgs,

        /// Name in the certificates directory, or path of a file
        #[arg(value_name = "NAME|FILENAME")]
        target: String,
    },

    /// Print out information of a certificate
    Info {
        /// Print the date until it is valid
        #[arg(long)]
        end_date: bool,

        /// Print the hash value
        #[arg(long)]
        hash: bool,

        /// Print the issuer
        #[arg(long)]
        issuer: bool,

        /// Print the subject
        #[arg(long = "name")]
        subject: bool,

        /// Print extensive information
        #[arg(long, conflicts_with_all = ["end_date", "hash", "issuer", "subject"])]
        full: bool,

        /// Name in the certificates directory, or path of a file
        #[arg(value_name = "NAME|FILENAME")]
        target: String,
    },

    /// List the certificates and requests built
    List {
        /// List the certificates
        #[arg(long)]
        certs: bool,

        /// List the certificate requests
        #[arg(long)]
        requests: bool,
    },

    /// Generate source files embedding a server certificate
    Lang {
        /// Language of the generated files: go or rust
        #[arg(long, default_value_t = Language::Go)]
        lang: Language,

        /// Name of the server's certificate
        #[arg(long)]
        server_cert: String,

        /// Name or file of the CA's certificate
        #[arg(long, default_value = NAME_CA)]
        ca_cert: String,

        /// Directory for the generated files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct CaArgs {
    /// Size in bits for the RSA key
    #[arg(long, default_value_t = RsaSize::default())]
    rsa_size: RsaSize,

    /// Number of years the CA certificate is valid
    #[arg(long, default_value_t = DEFAULT_CA_YEARS, value_parser = clap::value_parser!(u32).range(1..))]
    years: u32,

    /// Subject (default: "/CN=<hostname> Certificate Authority")
    #[arg(long)]
    subject: Option<String>,
}

impl From<CaArgs> for CaOptions {
    fn from(args: CaArgs) -> Self {
        Self {
            rsa_size: args.rsa_size,
            years: args.years,
            subject: args.subject,
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct KindArgs {
    /// The file is a certificate
    #[arg(long)]
    cert: bool,

    /// The file is a private key
    #[arg(long)]
    key: bool,
}

impl KindArgs {
    fn kind(&self) -> ArtifactKind {
        if self.key {
            ArtifactKind::Key
        } else {
            ArtifactKind::Cert
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.root, cli.openssl)?;

    match cli.command {
        Commands::New {
            ca,
            rsa_size,
            years,
            subject,
        } => {
            let opts = CaOptions {
                rsa_size,
                years,
                subject,
            };
            handle_new(&settings, ca, opts)
        }
        Commands::Ca { ca_args } => handle_ca(&settings, &ca_args.into()),
        Commands::Req {
            name,
            rsa_size,
            years,
            host,
            subject,
            sign,
            combined,
        } => {
            let hosts = match host {
                Some(list) => parse_hosts(&list)?,
                None => Vec::new(),
            };
            let opts = RequestOptions {
                rsa_size,
                subject,
                hosts,
            };
            handle_request(&settings, &name, &opts, sign.then_some(SignOptions { years, combined }))
        }
        Commands::Sign {
            name,
            years,
            combined,
        } => handle_sign(&settings, &name, &SignOptions { years, combined }),
        Commands::Revoke { name } => {
            let cert = revoke(&settings.openssl()?, &settings.layout, &name)?;
            println!("* Certificate revoked: {:?}", cert);
            println!("  Run `easycert crl` to publish the revocation list");
            Ok(())
        }
        Commands::Crl => {
            let crl = generate_crl(&settings.openssl()?, &settings.layout)?;
            println!("* Revocation list generated: {:?}", crl);
            Ok(())
        }
        Commands::Check { kind, target } => handle_check(&settings, kind.kind(), &target),
        Commands::Cat { kind, target } => handle_cat(&settings, kind.kind(), &target),
        Commands::Info {
            end_date,
            hash,
            issuer,
            subject,
            full,
            target,
        } => {
            let fields = InfoField::selected(end_date, hash, issuer, subject, full);
            handle_info(&settings, &fields, &target)
        }
        Commands::List { certs, requests } => {
            for line in list_lines(&settings.layout, certs, requests)? {
                println!("{}", line);
            }
            Ok(())
        }
        Commands::Lang {
            lang,
            server_cert,
            ca_cert,
            out_dir,
        } => {
            let (server, client) = emit_bindings(
                &settings.openssl()?,
                &settings.layout,
                lang,
                &server_cert,
                &ca_cert,
                &out_dir,
            )?;
            println!("* Generated {:?}", server);
            println!("* Generated {:?}", client);
            Ok(())
        }
    }
}

fn handle_new(settings: &Settings, with_ca: bool, ca_opts: CaOptions) -> Result<()> {
    let host_name = local_hostname()?;
    setup_dir(&settings.layout, &host_name)?;
    println!("* Directory structure created in {:?}", settings.layout.root);

    if with_ca {
        handle_ca(settings, &ca_opts)?;
    }
    Ok(())
}

fn handle_ca(settings: &Settings, opts: &CaOptions) -> Result<()> {
    let ca = build_ca(&settings.openssl()?, &settings.layout, opts)?;

    println!("✓ Created certification authority: {:?}", ca.cert);
    println!("  Private key: {:?}", ca.key);
    println!("  Valid for: {} years", opts.years);
    Ok(())
}

fn handle_request(
    settings: &Settings,
    name: &str,
    opts: &RequestOptions,
    sign: Option<SignOptions>,
) -> Result<()> {
    let openssl = settings.openssl()?;

    let paths = new_request(&openssl, &settings.layout, name, opts)?;
    println!("✓ Created certificate request: {:?}", paths.request);
    println!("  Private key: {:?}", paths.key);

    if let Some(sign_opts) = sign {
        print!("\n== Sign\n\n");
        handle_sign(settings, name, &sign_opts)?;
    }
    Ok(())
}

fn handle_sign(settings: &Settings, name: &str, opts: &SignOptions) -> Result<()> {
    let paths = sign_request(&settings.openssl()?, &settings.layout, name, opts)?;

    println!("✓ Signed certificate: {:?}", paths.cert);
    println!("  Valid for: {} years", opts.years);
    if opts.combined {
        println!("  Certificate and key: {:?}", paths.combined);
    }
    Ok(())
}

fn handle_check(settings: &Settings, kind: ArtifactKind, target: &str) -> Result<()> {
    let path = settings.layout.resolve_target(target, kind)?;
    let openssl = settings.openssl()?;

    match kind {
        ArtifactKind::Key => print!("{}", inspect::check_key(&openssl, &path)?),
        _ => {
            inspect::check_cert(&openssl, &path)?;
            println!("Certificate ok");
        }
    }
    Ok(())
}

fn handle_cat(settings: &Settings, kind: ArtifactKind, target: &str) -> Result<()> {
    let path = settings.layout.resolve_target(target, kind)?;
    let openssl = settings.openssl()?;

    let output = match kind {
        ArtifactKind::Key => inspect::cat_key(&openssl, &path)?,
        _ => inspect::cat_cert(&openssl, &path)?,
    };
    print!("{}", output);
    Ok(())
}

fn handle_info(settings: &Settings, fields: &[InfoField], target: &str) -> Result<()> {
    let path = settings.layout.resolve_target(target, ArtifactKind::Cert)?;
    let openssl = settings.openssl()?;

    for field in fields {
        print!("{}", inspect::info(&openssl, &path, *field)?);
    }
    Ok(())
}
