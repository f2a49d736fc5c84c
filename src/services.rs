//! Service labels for well-known port numbers.
//!
//! A static lookup only; nothing here talks to the network.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Label returned for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Static map of well-known ports to service labels.
static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // File transfer
    m.insert(20, "FTP-DATA");
    m.insert(21, "FTP");
    m.insert(22, "SSH");
    m.insert(69, "TFTP");
    m.insert(115, "SFTP");

    // Remote access
    m.insert(23, "TELNET");
    m.insert(2222, "SSH-ALT");
    m.insert(3389, "RDP");
    m.insert(5900, "VNC");
    m.insert(5901, "VNC-1");
    m.insert(5902, "VNC-2");

    // Email
    m.insert(25, "SMTP");
    m.insert(110, "POP3");
    m.insert(143, "IMAP");
    m.insert(465, "SMTPS");
    m.insert(587, "SMTP-Submission");
    m.insert(993, "IMAPS");
    m.insert(995, "POP3S");

    // Web
    m.insert(80, "HTTP");
    m.insert(443, "HTTPS");
    m.insert(4433, "HTTPS-ALT");
    m.insert(8000, "HTTP-DEV");
    m.insert(8008, "HTTP-ALT");
    m.insert(8080, "HTTP-ALT");
    m.insert(8081, "HTTP-ALT");
    m.insert(8181, "HTTP-ALT");
    m.insert(8443, "HTTPS-ALT");
    m.insert(8888, "HTTP-ALT");

    // Name and directory services
    m.insert(53, "DNS");
    m.insert(88, "Kerberos");
    m.insert(389, "LDAP");
    m.insert(636, "LDAPS");
    m.insert(3268, "Global-Catalog");
    m.insert(3269, "Global-Catalog-SSL");

    // Windows / SMB
    m.insert(135, "MSRPC");
    m.insert(137, "NetBIOS-NS");
    m.insert(138, "NetBIOS-DGM");
    m.insert(139, "NetBIOS-SSN");
    m.insert(445, "SMB");
    m.insert(593, "RPC-over-HTTP");

    // Databases and hosting panels
    m.insert(1433, "MSSQL");
    m.insert(1521, "Oracle");
    m.insert(1830, "Oracle-DB");
    m.insert(2049, "NFS");
    m.insert(2082, "cPanel");
    m.insert(2083, "cPanel-SSL");
    m.insert(2086, "WHM");
    m.insert(2087, "WHM-SSL");
    m.insert(2095, "Webmail");
    m.insert(2096, "Webmail-SSL");
    m.insert(3306, "MySQL");
    m.insert(5432, "PostgreSQL");
    m.insert(5433, "PostgreSQL-ALT");
    m.insert(6379, "Redis");
    m.insert(27017, "MongoDB");

    // Application servers
    m.insert(7001, "WebLogic");
    m.insert(7002, "WebLogic-SSL");
    m.insert(8005, "Tomcat-Shutdown");
    m.insert(8009, "Tomcat-AJP");
    m.insert(9000, "PHP-FPM");
    m.insert(9042, "Cassandra");
    m.insert(9200, "Elasticsearch");
    m.insert(9300, "Elasticsearch-Cluster");

    // Monitoring / management
    m.insert(3000, "Grafana");
    m.insert(5601, "Kibana");
    m.insert(9090, "Prometheus");
    m.insert(10000, "Webmin");

    // Containers
    m.insert(2375, "Docker");
    m.insert(2376, "Docker-SSL");
    m.insert(6443, "Kubernetes-API");
    m.insert(10250, "Kubelet");
    m.insert(10255, "Kubelet-RO");

    // VPN
    m.insert(500, "IPSec-IKE");
    m.insert(1194, "OpenVPN");
    m.insert(1701, "L2TP");
    m.insert(4500, "IPSec-NAT-T");

    // Messaging
    m.insert(5671, "RabbitMQ-SSL");
    m.insert(5672, "RabbitMQ");
    m.insert(9092, "Kafka");
    m.insert(61616, "ActiveMQ");

    // Cache / search
    m.insert(8983, "Solr");
    m.insert(11211, "Memcached");

    // Version control
    m.insert(3690, "Subversion");
    m.insert(9418, "Git");

    // Time / infrastructure
    m.insert(123, "NTP");
    m.insert(161, "SNMP");
    m.insert(162, "SNMP-TRAP");
    m.insert(179, "BGP");
    m.insert(5060, "SIP");
    m.insert(5061, "SIP-TLS");

    m
});

/// Look up the service label for a port, `None` if it is not in the table.
pub fn lookup(port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&port).copied()
}

/// Service label for a port, falling back to [`UNKNOWN_SERVICE`].
pub fn classify(port: u16) -> &'static str {
    lookup(port).unwrap_or(UNKNOWN_SERVICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_ports() {
        assert_eq!(classify(22), "SSH");
        assert_eq!(classify(80), "HTTP");
        assert_eq!(classify(443), "HTTPS");
        assert_eq!(classify(3306), "MySQL");
        assert_eq!(classify(445), "SMB");
    }

    #[test]
    fn test_unknown_port() {
        assert_eq!(lookup(31337), None);
        assert_eq!(classify(31337), UNKNOWN_SERVICE);
        assert_eq!(classify(0), "Unknown");
        assert_eq!(classify(u16::MAX), "Unknown");
    }
}
